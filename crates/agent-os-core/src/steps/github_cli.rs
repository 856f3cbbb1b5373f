use crate::error::Result;
use crate::pipeline::{FailureKind, Step, StepContext, StepOutcome};

const REMEDIATION: &[&str] = &[
    "The GitHub CLI is required for Agent OS to function properly.",
    "Please install it from: https://cli.github.com/",
    "",
    "Installation instructions:",
    "  macOS:   brew install gh",
    "  Windows: winget install --id GitHub.cli",
    "  Linux:   See https://github.com/cli/cli/blob/trunk/docs/install_linux.md",
];

/// `gh` must be on PATH: every Agent OS clone goes through it.
pub struct GitHubCliStep;

impl Step for GitHubCliStep {
    fn name(&self) -> &'static str {
        "github-cli"
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        if ctx.runner.probe("gh") {
            ctx.console.info("✓ GitHub CLI (gh) is installed");
            return Ok(StepOutcome::done("gh found on PATH"));
        }

        ctx.console.error("✗ GitHub CLI (gh) is not installed");
        ctx.console.newline();
        for line in REMEDIATION {
            if line.is_empty() {
                ctx.console.newline();
            } else {
                ctx.console.line(line);
            }
        }
        Ok(StepOutcome::failed(
            FailureKind::PresenceCheck,
            "gh not found on PATH (see https://cli.github.com/)",
        ))
    }
}
