use crate::error::Result;
use crate::pipeline::{describe_failure, FailureKind, Step, StepContext, StepOutcome};

/// Each is required on its own; only the missing ones are installed.
pub const PACKAGES: &[&str] = &["barryvdh/laravel-debugbar", "barryvdh/laravel-ide-helper"];

pub struct DevToolsStep;

impl Step for DevToolsStep {
    fn name(&self) -> &'static str {
        "dev-tools"
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let manifest = ctx.manifest().read()?;
        let missing = manifest.missing_dev_dependencies(PACKAGES);

        if missing.is_empty() {
            ctx.console.info("✓ Development tools are already installed");
            return Ok(StepOutcome::done("already installed"));
        }

        ctx.console.info(&format!(
            "Installing development tools: {}",
            missing.join(", ")
        ));
        let command = ctx.require_dev_command(&missing);
        let outcome = ctx.run_streamed(&command)?;
        if !outcome.success {
            ctx.console.error("Failed to install development tools");
            return Ok(StepOutcome::failed(
                FailureKind::ExternalProcess,
                describe_failure(&command, &outcome),
            ));
        }

        ctx.console.info("✓ Development tools installed successfully");
        Ok(StepOutcome::done(format!("installed {}", missing.join(", "))))
    }
}
