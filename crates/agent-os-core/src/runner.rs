//! External process invocation: package-manager installs, clones, the
//! project bootstrap script, and PATH presence checks.
//!
//! A command that runs but fails (non-zero exit, timeout) is reported as an
//! unsuccessful [`ProcessOutcome`]. Only a command that cannot be launched at
//! all is an `Err`.

use crate::error::{InstallerError, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(25);
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell-like rendering for logs and messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: Stream,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub success: bool,
    /// `None` when the process was killed or terminated by a signal.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

impl ProcessOutcome {
    pub fn exited(code: i32) -> Self {
        Self {
            success: code == 0,
            exit_code: Some(code),
            timed_out: false,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            success: false,
            exit_code: None,
            timed_out: true,
        }
    }

    fn from_status(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            exit_code: status.code(),
            timed_out: false,
        }
    }
}

pub trait ProcessRunner {
    /// Run `command` to completion or until its timeout, handing every
    /// output line to `on_line` as it arrives.
    fn run(&self, command: &CommandSpec, on_line: &mut dyn FnMut(OutputLine))
        -> Result<ProcessOutcome>;

    /// Is `program` available on PATH? Output is discarded.
    fn probe(&self, program: &str) -> bool;
}

// ---------------------------------------------------------------------------
// SystemRunner
// ---------------------------------------------------------------------------

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        command: &CommandSpec,
        on_line: &mut dyn FnMut(OutputLine),
    ) -> Result<ProcessOutcome> {
        debug!(command = %command.display(), cwd = %command.cwd.display(), "spawning");

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| InstallerError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        // Dedicated reader threads avoid pipe-buffer deadlocks; lines are
        // funnelled back here so the callback runs on the caller's thread.
        let (tx, rx) = mpsc::channel();
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, Stream::Stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, Stream::Stderr, tx);
        }

        let deadline = Instant::now() + command.timeout;

        // The exit status decides completion, not the pipes: a background
        // process started by the command may inherit them and keep them open.
        let status = loop {
            match rx.recv_timeout(EXIT_POLL_INTERVAL) {
                Ok(line) => on_line(line),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => thread::sleep(EXIT_POLL_INTERVAL),
            }
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                return Ok(kill_after_timeout(&mut child, command));
            }
        };

        // Pass on output still buffered in the pipes.
        let grace = Instant::now() + OUTPUT_GRACE;
        loop {
            let now = Instant::now();
            if now >= grace {
                debug!(command = %command.display(), "output still open after exit");
                break;
            }
            match rx.recv_timeout(grace - now) {
                Ok(line) => on_line(line),
                Err(_) => break,
            }
        }

        let outcome = ProcessOutcome::from_status(status);
        debug!(command = %command.display(), exit_code = ?outcome.exit_code, "exited");
        Ok(outcome)
    }

    fn probe(&self, program: &str) -> bool {
        let found = which::which(program);
        debug!(program, found = found.is_ok(), "probe");
        found.is_ok()
    }
}

fn spawn_reader<R>(pipe: R, stream: Stream, tx: Sender<OutputLine>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\r', '\n'])
                        .to_string();
                    if tx.send(OutputLine { stream, text }).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

fn kill_after_timeout(child: &mut Child, command: &CommandSpec) -> ProcessOutcome {
    warn!(
        command = %command.display(),
        timeout_secs = command.timeout.as_secs(),
        "timed out; killing"
    );
    if let Err(e) = child.kill() {
        warn!(error = %e, "kill failed");
    }
    if let Err(e) = child.wait() {
        warn!(error = %e, "reaping killed process failed");
    }
    ProcessOutcome::timed_out()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str, timeout: Duration) -> CommandSpec {
        CommandSpec::new("sh", std::env::temp_dir(), timeout).args(["-c", script])
    }

    #[test]
    fn streams_lines_from_both_streams() {
        let mut lines = Vec::new();
        let outcome = SystemRunner
            .run(
                &sh("echo one; echo two >&2; echo three", Duration::from_secs(10)),
                &mut |line| lines.push(line),
            )
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.exit_code, Some(0));

        let stdout: Vec<&str> = lines
            .iter()
            .filter(|l| l.stream == Stream::Stdout)
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(stdout, vec!["one", "three"]);
        assert!(lines
            .iter()
            .any(|l| l.stream == Stream::Stderr && l.text == "two"));
    }

    #[test]
    fn non_zero_exit_is_not_an_error() {
        let outcome = SystemRunner
            .run(&sh("exit 3", Duration::from_secs(10)), &mut |_| {})
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(3));
        assert!(!outcome.timed_out);
    }

    #[test]
    fn timeout_kills_the_process() {
        let start = Instant::now();
        let outcome = SystemRunner
            .run(&sh("exec sleep 30", Duration::from_millis(300)), &mut |_| {})
            .unwrap();
        assert!(outcome.timed_out);
        assert!(!outcome.success);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn exit_is_reported_while_a_background_child_holds_the_pipes() {
        let start = Instant::now();
        let mut lines = Vec::new();
        let outcome = SystemRunner
            .run(
                &sh("sleep 6 & echo done; exit 0", Duration::from_secs(3)),
                &mut |line| lines.push(line.text),
            )
            .unwrap();
        assert!(outcome.success, "{outcome:?}");
        assert_eq!(outcome.exit_code, Some(0));
        assert!(!outcome.timed_out);
        assert!(start.elapsed() < Duration::from_secs(3));
        assert_eq!(lines, vec!["done"]);
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let cmd = CommandSpec::new(
            "definitely-not-a-real-binary-4821",
            std::env::temp_dir(),
            Duration::from_secs(5),
        );
        let err = SystemRunner.run(&cmd, &mut |_| {}).unwrap_err();
        assert!(matches!(err, InstallerError::Spawn { .. }));
    }

    #[test]
    fn probe_finds_sh_but_not_nonsense() {
        assert!(SystemRunner.probe("sh"));
        assert!(!SystemRunner.probe("definitely-not-a-real-binary-4821"));
    }

    #[test]
    fn display_joins_program_and_args() {
        let cmd = CommandSpec::new("composer", "/app", Duration::from_secs(1))
            .args(["require", "--dev", "laravel/pint"]);
        assert_eq!(cmd.display(), "composer require --dev laravel/pint");
    }
}
