//! In-memory fakes for the filesystem, process and console capabilities.

use crate::console::Console;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::manifest::ManifestInspector;
use crate::runner::{CommandSpec, OutputLine, ProcessOutcome, ProcessRunner, Stream};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// MemoryFs
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RefCell<BTreeMap<PathBuf, String>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
    writes: Cell<usize>,
    temp_counter: Cell<usize>,
    fail_copies: Cell<bool>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file without counting it as a write.
    pub fn put(&self, path: impl AsRef<Path>, content: &str) {
        self.files
            .borrow_mut()
            .insert(path.as_ref().to_path_buf(), content.to_string());
    }

    pub fn mkdir(&self, path: impl AsRef<Path>) {
        self.dirs.borrow_mut().insert(path.as_ref().to_path_buf());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    /// Number of write or append calls since creation.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Every file path at or under `dir`.
    pub fn files_under(&self, dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let dir = dir.as_ref();
        self.files
            .borrow()
            .keys()
            .filter(|p| p.starts_with(dir))
            .cloned()
            .collect()
    }

    /// `copy_dir` copies a single file and then fails.
    pub fn failing_copies(self) -> Self {
        self.fail_copies.set(true);
        self
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, path.display().to_string())
    }
}

impl FileSystem for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.borrow().iter().any(|d| d.starts_with(path))
            || self
                .files
                .borrow()
                .keys()
                .any(|f| f != path && f.starts_with(path))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.get(path).ok_or_else(|| Self::not_found(path))
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.writes.set(self.writes.get() + 1);
        self.put(path, &String::from_utf8_lossy(data));
        Ok(())
    }

    fn append(&self, path: &Path, text: &str) -> io::Result<()> {
        self.writes.set(self.writes.get() + 1);
        self.files
            .borrow_mut()
            .entry(path.to_path_buf())
            .or_default()
            .push_str(text);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.mkdir(path);
        Ok(())
    }

    fn copy_dir(&self, from: &Path, to: &Path) -> io::Result<()> {
        if !self.is_dir(from) {
            return Err(Self::not_found(from));
        }
        let copies: Vec<(PathBuf, String)> = self
            .files
            .borrow()
            .iter()
            .filter_map(|(p, c)| {
                let rel = p.strip_prefix(from).ok()?;
                Some((to.join(rel), c.clone()))
            })
            .collect();
        self.mkdir(to);
        if self.fail_copies.get() {
            self.files.borrow_mut().extend(copies.into_iter().take(1));
            return Err(io::Error::other("no space left on device"));
        }
        self.files.borrow_mut().extend(copies);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.files.borrow_mut().retain(|p, _| !p.starts_with(path));
        self.dirs.borrow_mut().retain(|d| !d.starts_with(path));
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if !self.exists(from) {
            return Err(Self::not_found(from));
        }
        let moved = |p: &PathBuf| match p.strip_prefix(from) {
            Ok(rel) if rel.as_os_str().is_empty() => to.to_path_buf(),
            Ok(rel) => to.join(rel),
            Err(_) => p.clone(),
        };
        let files = std::mem::take(&mut *self.files.borrow_mut());
        *self.files.borrow_mut() = files.into_iter().map(|(p, c)| (moved(&p), c)).collect();
        let dirs = std::mem::take(&mut *self.dirs.borrow_mut());
        *self.dirs.borrow_mut() = dirs.iter().map(moved).collect();
        Ok(())
    }

    fn temp_dir(&self, prefix: &str) -> io::Result<PathBuf> {
        let n = self.temp_counter.get() + 1;
        self.temp_counter.set(n);
        let dir = PathBuf::from("/tmp").join(format!("{prefix}{n}"));
        self.mkdir(&dir);
        Ok(dir)
    }
}

// ---------------------------------------------------------------------------
// RecordingRunner
// ---------------------------------------------------------------------------

/// Records every command and probe. When given a [`MemoryFs`] it also
/// imitates the effects of successful `composer` and `gh` invocations.
#[derive(Default)]
pub struct RecordingRunner<'a> {
    fs: Option<&'a MemoryFs>,
    available: BTreeSet<String>,
    failures: Vec<(String, i32)>,
    clone_without_profile: bool,
    runs: RefCell<Vec<CommandSpec>>,
    probes: RefCell<Vec<String>>,
}

impl<'a> RecordingRunner<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn simulating(fs: &'a MemoryFs) -> Self {
        Self {
            fs: Some(fs),
            ..Self::default()
        }
    }

    /// Make `program` visible to `probe`.
    pub fn with_program(mut self, program: &str) -> Self {
        self.available.insert(program.to_string());
        self
    }

    /// Any command whose rendering contains `pattern` exits with `code`.
    pub fn failing(mut self, pattern: &str, code: i32) -> Self {
        self.failures.push((pattern.to_string(), code));
        self
    }

    /// Simulated clones contain no `profiles/` directory.
    pub fn clone_without_profile(mut self) -> Self {
        self.clone_without_profile = true;
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.runs.borrow().iter().map(CommandSpec::display).collect()
    }

    pub fn runs(&self) -> Vec<CommandSpec> {
        self.runs.borrow().clone()
    }

    pub fn probes(&self) -> Vec<String> {
        self.probes.borrow().clone()
    }

    pub fn count_starting_with(&self, prefix: &str) -> usize {
        self.commands().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn simulate(&self, fs: &MemoryFs, spec: &CommandSpec) {
        let args: Vec<&str> = spec.args.iter().map(String::as_str).collect();
        let manifest = ManifestInspector::new(fs, spec.cwd.join("composer.json"));
        match (spec.program.as_str(), args.as_slice()) {
            ("composer", ["require", "--dev", rest @ ..]) => {
                let _ = manifest.update(|m| {
                    for pkg in rest.iter().filter(|a| !a.starts_with("--")) {
                        m.add_dev_dependency(pkg, "*");
                    }
                });
            }
            ("composer", ["config", "--no-plugins", setting, "true"]) => {
                if let Some(plugin) = setting.strip_prefix("allow-plugins.") {
                    let _ = manifest.update(|m| {
                        m.allow_plugin(plugin);
                    });
                }
            }
            ("gh", ["repo", "clone", _repo, target, ..]) => {
                let target = spec.cwd.join(target);
                fs.put(target.join("README.md"), "# Agent OS\n");
                if !self.clone_without_profile {
                    fs.put(target.join("profiles/laravel/config.yml"), "name: laravel\n");
                    fs.put(target.join("profiles/default/config.yml"), "name: default\n");
                }
                fs.put(target.join("scripts/project-install.sh"), "#!/bin/sh\n");
            }
            _ => {}
        }
    }
}

impl ProcessRunner for RecordingRunner<'_> {
    fn run(
        &self,
        command: &CommandSpec,
        on_line: &mut dyn FnMut(OutputLine),
    ) -> Result<ProcessOutcome> {
        self.runs.borrow_mut().push(command.clone());
        let display = command.display();
        on_line(OutputLine {
            stream: Stream::Stdout,
            text: format!("> {display}"),
        });

        if let Some((_, code)) = self.failures.iter().find(|(p, _)| display.contains(p.as_str())) {
            return Ok(ProcessOutcome::exited(*code));
        }
        if let Some(fs) = self.fs {
            self.simulate(fs, command);
        }
        Ok(ProcessOutcome::exited(0))
    }

    fn probe(&self, program: &str) -> bool {
        self.probes.borrow_mut().push(program.to_string());
        self.available.contains(program)
    }
}

// ---------------------------------------------------------------------------
// ScriptedConsole
// ---------------------------------------------------------------------------

/// Answers confirmations from a queue (falling back to the default) and
/// captures everything printed.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<bool>,
    pub questions: Vec<String>,
    pub lines: Vec<String>,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn transcript(&self) -> String {
        self.lines.join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

impl Console for ScriptedConsole {
    fn info(&mut self, message: &str) {
        self.lines.push(format!("info: {message}"));
    }

    fn warn(&mut self, message: &str) {
        self.lines.push(format!("warn: {message}"));
    }

    fn error(&mut self, message: &str) {
        self.lines.push(format!("error: {message}"));
    }

    fn line(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }

    fn newline(&mut self) {
        self.lines.push(String::new());
    }

    fn process_output(&mut self, line: &OutputLine) {
        self.lines.push(format!("| {}", line.text));
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(default))
    }
}
