//! Agent OS itself, cloned into the home directory with the project's
//! profile available under `profiles/`.

use crate::error::Result;
use crate::fs::FileSystem;
use crate::paths;
use crate::pipeline::{describe_failure, FailureKind, Step, StepContext, StepOutcome};
use crate::runner::CommandSpec;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationState {
    NotInstalled,
    /// The checkout exists but lacks the configured profile.
    MissingProfile,
    FullyInstalled,
}

pub fn detect(fs: &dyn FileSystem, agent_os_dir: &Path, profile: &str) -> InstallationState {
    if fs.is_dir(&paths::profile_dir(agent_os_dir, profile)) {
        InstallationState::FullyInstalled
    } else if fs.is_dir(agent_os_dir) {
        InstallationState::MissingProfile
    } else {
        InstallationState::NotInstalled
    }
}

/// Removes a scratch directory when dropped, whichever way the step exits.
/// A directory that has since been moved away is left alone.
struct ScratchDir<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
}

impl Drop for ScratchDir<'_> {
    fn drop(&mut self) {
        if !self.fs.exists(&self.path) {
            return;
        }
        if let Err(e) = self.fs.remove_dir_all(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove scratch directory");
        }
    }
}

/// Sibling of the profile directory that a copy is assembled in. The name
/// never matches a profile, so a half-written copy is not detected as one.
fn staging_dir(agent_os_dir: &Path, profile: &str) -> PathBuf {
    paths::profiles_dir(agent_os_dir).join(format!(".{profile}.partial"))
}

pub struct AgentOsStep;

impl Step for AgentOsStep {
    fn name(&self) -> &'static str {
        "agent-os"
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let agent_os_dir = ctx.config.agent_os_dir()?;
        let profile = ctx.config.profile.clone();
        let state = detect(ctx.fs, &agent_os_dir, &profile);
        debug!(dir = %agent_os_dir.display(), ?state, "agent os state");

        match state {
            InstallationState::FullyInstalled => {
                ctx.console
                    .info(&format!("✓ Agent OS with the {profile} profile is installed"));
                Ok(StepOutcome::done("already installed"))
            }
            InstallationState::NotInstalled => clone_repository(ctx, &agent_os_dir),
            InstallationState::MissingProfile => install_profile(ctx, &agent_os_dir, &profile),
        }
    }
}

fn clone_repository(ctx: &mut StepContext<'_>, agent_os_dir: &Path) -> Result<StepOutcome> {
    ctx.console
        .warn("Agent OS is not installed in your home directory.");
    ctx.console.line(&format!(
        "This will clone the Agent OS repository to: {}",
        agent_os_dir.display()
    ));
    ctx.console.newline();

    if !ctx.confirm("Would you like to install Agent OS now?", true)? {
        ctx.console
            .error("Agent OS installation is required to continue.");
        return Ok(StepOutcome::failed(
            FailureKind::UserDeclined,
            "declined to install Agent OS",
        ));
    }

    ctx.console.info("Cloning Agent OS repository...");
    let home = ctx.config.home_dir()?;
    let command = CommandSpec::new("gh", home, ctx.config.install_timeout())
        .args(["repo", "clone"])
        .arg(ctx.config.repository.as_str())
        .arg(ctx.config.install_dir_name.as_str());
    let outcome = ctx.run_streamed(&command)?;
    if !outcome.success {
        ctx.console.error("Failed to clone Agent OS repository");
        return Ok(StepOutcome::failed(
            FailureKind::ExternalProcess,
            describe_failure(&command, &outcome),
        ));
    }

    ctx.console.info("✓ Agent OS installed successfully");
    Ok(StepOutcome::done("cloned"))
}

fn install_profile(ctx: &mut StepContext<'_>, agent_os_dir: &Path, profile: &str) -> Result<StepOutcome> {
    let dest = paths::profile_dir(agent_os_dir, profile);
    ctx.console.warn(&format!(
        "Agent OS is installed but missing the {profile} profile."
    ));
    ctx.console.line(&format!(
        "This will add the {profile} profile to: {}",
        dest.display()
    ));
    ctx.console.newline();

    let question = format!("Would you like to install the {profile} profile now?");
    if !ctx.confirm(&question, true)? {
        ctx.console.error(&format!(
            "The {profile} profile installation is required to continue."
        ));
        return Ok(StepOutcome::failed(
            FailureKind::UserDeclined,
            format!("declined to install the {profile} profile"),
        ));
    }

    ctx.console.info(&format!("Installing the {profile} profile..."));
    ctx.fs.create_dir_all(&paths::profiles_dir(agent_os_dir))?;

    // Shallow-clone into scratch space and copy only the profile across.
    let guard = ScratchDir {
        fs: ctx.fs,
        path: ctx.fs.temp_dir("agent-os-temp-")?,
    };
    let checkout = guard.path.join("agent-os");
    let command = CommandSpec::new("gh", ctx.config.home_dir()?, ctx.config.install_timeout())
        .args(["repo", "clone"])
        .arg(ctx.config.repository.as_str())
        .arg(checkout.to_string_lossy())
        .args(["--", "--depth", "1"]);
    let outcome = ctx.run_streamed(&command)?;
    if !outcome.success {
        ctx.console.error("Failed to clone Agent OS repository");
        return Ok(StepOutcome::failed(
            FailureKind::ExternalProcess,
            describe_failure(&command, &outcome),
        ));
    }

    let source = paths::profile_dir(&checkout, profile);
    if !ctx.fs.is_dir(&source) {
        ctx.console
            .error(&format!("The {profile} profile was not found in the repository"));
        return Ok(StepOutcome::failed(
            FailureKind::ExternalProcess,
            format!("{} has no profiles/{profile}", ctx.config.repository),
        ));
    }

    // Assemble the copy beside its final place, then move it in whole.
    let staging = ScratchDir {
        fs: ctx.fs,
        path: staging_dir(agent_os_dir, profile),
    };
    if ctx.fs.exists(&staging.path) {
        debug!(path = %staging.path.display(), "removing stale partial profile");
        ctx.fs.remove_dir_all(&staging.path)?;
    }
    ctx.fs.copy_dir(&source, &staging.path)?;
    ctx.fs.rename(&staging.path, &dest)?;

    ctx.console
        .info(&format!("✓ The {profile} profile installed successfully"));
    Ok(StepOutcome::done(format!("{profile} profile added")))
}
