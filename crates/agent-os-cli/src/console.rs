use agent_os_core::console::Console;
use agent_os_core::runner::{OutputLine, Stream};
use agent_os_core::{InstallerError, Result};
use dialoguer::console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use std::io::{self, BufRead, IsTerminal, Write};

/// Styled terminal output plus yes/no prompts.
///
/// With `--json` every message goes to stderr so stdout carries only the
/// summary document.
pub struct TerminalConsole {
    to_stderr: bool,
}

impl TerminalConsole {
    pub fn new(to_stderr: bool) -> Self {
        Self { to_stderr }
    }

    fn emit(&self, text: &str) {
        if self.to_stderr {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    }

    /// Piped stdin: read one line, an empty line or EOF meaning `default`.
    fn confirm_from_stdin(&self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        if self.to_stderr {
            eprint!("{question} {hint} ");
        } else {
            print!("{question} {hint} ");
            let _ = io::stdout().flush();
        }

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        let answer = answer.trim().to_ascii_lowercase();
        self.emit("");
        Ok(match answer.as_str() {
            "y" | "yes" => true,
            "n" | "no" => false,
            _ => default,
        })
    }
}

impl Console for TerminalConsole {
    fn info(&mut self, message: &str) {
        self.emit(&style(message).green().to_string());
    }

    fn warn(&mut self, message: &str) {
        self.emit(&style(message).yellow().to_string());
    }

    fn error(&mut self, message: &str) {
        self.emit(&style(message).red().bold().to_string());
    }

    fn line(&mut self, message: &str) {
        self.emit(message);
    }

    fn newline(&mut self) {
        self.emit("");
    }

    fn process_output(&mut self, line: &OutputLine) {
        match line.stream {
            Stream::Stdout => self.emit(&line.text),
            Stream::Stderr => self.emit(&style(&line.text).dim().to_string()),
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        if !io::stdin().is_terminal() {
            return self.confirm_from_stdin(question, default);
        }
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .default(default)
            .interact()
            .map_err(|e| InstallerError::Prompt(e.to_string()))
    }
}
