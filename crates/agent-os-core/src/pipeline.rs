//! The ordered, fail-fast step runner behind `install` and `optimize-reviews`.

use crate::config::InstallerConfig;
use crate::console::Console;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::manifest::ManifestInspector;
use crate::reconcile::{ConfigFileReconciler, ConfigFormat, Reconciled, Reconciliation, ToolConfig};
use crate::runner::{CommandSpec, ProcessOutcome, ProcessRunner};
use crate::steps;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Step contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// A prerequisite CLI or file is not present.
    PresenceCheck,
    UserDeclined,
    /// An install, clone or bootstrap command exited non-zero or timed out.
    ExternalProcess,
    /// The manifest or a config file could not be read or written, or a
    /// process could not be launched at all.
    Environment,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::PresenceCheck => "presence-check",
            FailureKind::UserDeclined => "user-declined",
            FailureKind::ExternalProcess => "external-process",
            FailureKind::Environment => "environment",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done(String),
    Failed { kind: FailureKind, message: String },
}

impl StepOutcome {
    pub fn done(message: impl Into<String>) -> Self {
        StepOutcome::Done(message.into())
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        StepOutcome::Failed {
            kind,
            message: message.into(),
        }
    }
}

/// One idempotent detect-and-reconcile unit.
///
/// `Ok(Failed)` is an expected failure the step has already explained to
/// the user. `Err` is an environment problem the pipeline reports for it.
pub trait Step {
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome>;
}

// ---------------------------------------------------------------------------
// StepContext
// ---------------------------------------------------------------------------

/// Capabilities handed to every step.
pub struct StepContext<'a> {
    pub config: &'a InstallerConfig,
    pub fs: &'a dyn FileSystem,
    pub runner: &'a dyn ProcessRunner,
    pub console: &'a mut dyn Console,
}

impl<'a> StepContext<'a> {
    pub fn new(
        config: &'a InstallerConfig,
        fs: &'a dyn FileSystem,
        runner: &'a dyn ProcessRunner,
        console: &'a mut dyn Console,
    ) -> Self {
        Self {
            config,
            fs,
            runner,
            console,
        }
    }

    pub fn manifest(&self) -> ManifestInspector<'a> {
        ManifestInspector::new(self.fs, self.config.manifest_path())
    }

    pub fn reconciler(&self) -> ConfigFileReconciler<'a> {
        ConfigFileReconciler::new(self.fs, self.config.root.clone())
    }

    /// Ask the user, unless every prompt is pre-answered with `--yes`.
    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        if self.config.assume_yes {
            self.console.line(&format!("{question} yes"));
            return Ok(true);
        }
        self.console.confirm(question, default)
    }

    /// Run a command, echoing its output to the console as it arrives.
    pub fn run_streamed(&mut self, command: &CommandSpec) -> Result<ProcessOutcome> {
        let runner = self.runner;
        let console = &mut *self.console;
        runner.run(command, &mut |line| console.process_output(&line))
    }

    /// A command in the project root.
    pub fn project_command(&self, program: &str, timeout: std::time::Duration) -> CommandSpec {
        CommandSpec::new(program, self.config.root.clone(), timeout)
    }

    /// `composer require --dev <packages> --with-all-dependencies`
    pub fn require_dev_command(&self, packages: &[&str]) -> CommandSpec {
        self.project_command("composer", self.config.install_timeout())
            .args(["require", "--dev"])
            .args(packages.iter().copied())
            .arg("--with-all-dependencies")
    }

    /// Reconcile one tool config and tell the user what happened.
    /// Returns a short note for the step summary.
    pub fn ensure_config(&mut self, tool: &ToolConfig) -> Result<String> {
        let result = self.reconciler().ensure(tool)?;
        Ok(self.report_config(tool, &result))
    }

    fn report_config(&mut self, tool: &ToolConfig, result: &Reconciled) -> String {
        let path = tool.path;
        if let Some(warning) = &result.warning {
            self.console.warn(&format!("⚠ {path}: {warning}"));
            return format!("{path} kept (warning)");
        }
        match (result.status, &tool.format) {
            (Reconciliation::Created, _) => {
                self.console
                    .info(&format!("✓ Created {path} with default configuration"));
                format!("{path} created")
            }
            (Reconciliation::Merged, _) => {
                self.console
                    .info(&format!("✓ Updated {path} with recommended defaults"));
                format!("{path} merged")
            }
            (Reconciliation::Unchanged, ConfigFormat::Structured { .. }) => {
                self.console
                    .info(&format!("✓ {path} configuration is up to date"));
                format!("{path} up to date")
            }
            (Reconciliation::Unchanged, _) => {
                self.console.info(&format!(
                    "✓ {path} configuration already exists (preserving existing configuration)"
                ));
                format!("{path} kept")
            }
        }
    }
}

/// Human-readable reason an external command did not succeed.
pub fn describe_failure(command: &CommandSpec, outcome: &ProcessOutcome) -> String {
    if outcome.timed_out {
        format!(
            "`{}` timed out after {}s",
            command.display(),
            command.timeout.as_secs()
        )
    } else {
        match outcome.exit_code {
            Some(code) => format!("`{}` exited with status {code}", command.display()),
            None => format!("`{}` was terminated by a signal", command.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PipelineStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: &'static str,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    pub records: Vec<StepRecord>,
    pub status: PipelineStatus,
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        self.status == PipelineStatus::Success
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.records.iter().find(|r| !r.success)
    }
}

// ---------------------------------------------------------------------------
// InstallPipeline
// ---------------------------------------------------------------------------

pub struct InstallPipeline {
    steps: Vec<Box<dyn Step>>,
}

impl InstallPipeline {
    pub fn new(steps: Vec<Box<dyn Step>>) -> Self {
        Self { steps }
    }

    /// The full provisioning sequence. Later steps rely on packages declared
    /// by earlier ones, so the order is fixed.
    pub fn install() -> Self {
        Self::new(vec![
            Box::new(steps::github_cli::GitHubCliStep),
            Box::new(steps::agent_os::AgentOsStep),
            Box::new(steps::pest::step()),
            Box::new(steps::pint::step()),
            Box::new(steps::phpstan::step()),
            Box::new(steps::rector::step()),
            Box::new(steps::duster::step()),
            Box::new(steps::code_sniffer::step()),
            Box::new(steps::enlightn::step()),
            Box::new(steps::dev_tools::DevToolsStep),
            Box::new(steps::scripts::ComposerScriptsStep),
            Box::new(steps::bootstrap::ProjectBootstrapStep),
        ])
    }

    pub fn optimize_reviews() -> Self {
        Self::new(vec![Box::new(steps::claude_app::ClaudeGitHubAppStep)])
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order, stopping at the first failure. Nothing
    /// applied by earlier steps is rolled back.
    pub fn run(&self, ctx: &mut StepContext<'_>) -> PipelineResult {
        let mut records = Vec::with_capacity(self.steps.len());

        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                ctx.console.newline();
            }
            debug!(step = step.name(), "running step");

            let record = match step.run(ctx) {
                Ok(StepOutcome::Done(message)) => StepRecord {
                    step: step.name(),
                    success: true,
                    message,
                    failure: None,
                },
                Ok(StepOutcome::Failed { kind, message }) => StepRecord {
                    step: step.name(),
                    success: false,
                    message,
                    failure: Some(kind),
                },
                Err(e) => {
                    ctx.console.error(&format!("✗ {e}"));
                    StepRecord {
                        step: step.name(),
                        success: false,
                        message: e.to_string(),
                        failure: Some(FailureKind::Environment),
                    }
                }
            };

            let failed = !record.success;
            records.push(record);
            if failed {
                info!(step = step.name(), "step failed; stopping");
                return PipelineResult {
                    records,
                    status: PipelineStatus::Failure,
                };
            }
        }

        PipelineResult {
            records,
            status: PipelineStatus::Success,
        }
    }
}
