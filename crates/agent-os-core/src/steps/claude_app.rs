use crate::error::Result;
use crate::paths;
use crate::pipeline::{FailureKind, Step, StepContext, StepOutcome};

const WORKFLOWS: &[&str] = &[paths::CLAUDE_WORKFLOW, paths::CLAUDE_REVIEW_WORKFLOW];

/// The Claude GitHub App leaves two workflow files behind when installed.
pub struct ClaudeGitHubAppStep;

impl Step for ClaudeGitHubAppStep {
    fn name(&self) -> &'static str {
        "claude-github-app"
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let missing: Vec<&str> = WORKFLOWS
            .iter()
            .copied()
            .filter(|w| !ctx.fs.exists(&ctx.config.project_path(w)))
            .collect();

        if missing.is_empty() {
            ctx.console.info("✓ Claude GitHub App is installed");
            return Ok(StepOutcome::done("workflows present"));
        }

        ctx.console.error("✗ Claude GitHub App is not installed");
        ctx.console.newline();
        ctx.console
            .line("The Claude GitHub App must be installed before optimizing reviews.");
        ctx.console.newline();
        ctx.console.warn("To install the Claude GitHub App:");
        ctx.console.line("  1. Open Claude Code (claude.ai/code)");
        ctx.console.line("  2. Run the command: /install-github-app");
        ctx.console
            .line("  3. Follow the prompts to authenticate and install the app");
        ctx.console.line("  4. Once complete, run this command again");
        ctx.console.newline();
        ctx.console.line("This will create the following files:");
        for workflow in WORKFLOWS {
            ctx.console.line(&format!("  - {workflow}"));
        }

        Ok(StepOutcome::failed(
            FailureKind::PresenceCheck,
            format!("missing {}", missing.join(", ")),
        ))
    }
}
