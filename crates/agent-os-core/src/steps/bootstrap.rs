use crate::error::Result;
use crate::paths;
use crate::pipeline::{describe_failure, FailureKind, Step, StepContext, StepOutcome};
use crate::runner::CommandSpec;

/// Runs Agent OS's own `project-install.sh` against the project.
pub struct ProjectBootstrapStep;

impl Step for ProjectBootstrapStep {
    fn name(&self) -> &'static str {
        "project-bootstrap"
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        ctx.console.info("Installing Agent OS in project...");

        let script = paths::project_install_script(&ctx.config.agent_os_dir()?);
        if !ctx.fs.exists(&script) {
            ctx.console
                .error(&format!("✗ {} not found", script.display()));
            ctx.console
                .line("Check that Agent OS is fully cloned, then run this command again.");
            return Ok(StepOutcome::failed(
                FailureKind::PresenceCheck,
                format!("{} not found", script.display()),
            ));
        }

        let command = CommandSpec::new(
            script.to_string_lossy(),
            ctx.config.root.clone(),
            ctx.config.install_timeout(),
        )
        .args(["--multi-agent-mode", "true", "--single-agent-mode", "true", "--profile"])
        .arg(ctx.config.profile.as_str());

        let outcome = ctx.run_streamed(&command)?;
        if !outcome.success {
            ctx.console.error("Failed to install Agent OS in project");
            return Ok(StepOutcome::failed(
                FailureKind::ExternalProcess,
                describe_failure(&command, &outcome),
            ));
        }

        ctx.console
            .info("✓ Agent OS installed in project successfully");
        Ok(StepOutcome::done("project-install.sh completed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstallerConfig;
    use crate::testing::{MemoryFs, RecordingRunner, ScriptedConsole};
    use std::path::PathBuf;

    fn config() -> InstallerConfig {
        let mut cfg = InstallerConfig::for_project("/srv/app");
        cfg.home = Some("/home/dev".into());
        cfg
    }

    #[test]
    fn runs_install_script_in_project_root() {
        let fs = MemoryFs::new();
        fs.put("/home/dev/agent-os/scripts/project-install.sh", "#!/bin/sh\n");
        let runner = RecordingRunner::new();
        let mut console = ScriptedConsole::new();
        let cfg = config();
        let mut ctx = StepContext::new(&cfg, &fs, &runner, &mut console);

        assert!(matches!(ProjectBootstrapStep.run(&mut ctx).unwrap(), StepOutcome::Done(_)));
        let run = &runner.runs()[0];
        assert_eq!(run.program, "/home/dev/agent-os/scripts/project-install.sh");
        assert_eq!(
            run.args,
            vec!["--multi-agent-mode", "true", "--single-agent-mode", "true", "--profile", "laravel"]
        );
        assert_eq!(run.cwd, PathBuf::from("/srv/app"));
    }

    #[test]
    fn missing_script_fails_without_spawning() {
        let fs = MemoryFs::new();
        let runner = RecordingRunner::new();
        let mut console = ScriptedConsole::new();
        let cfg = config();
        let mut ctx = StepContext::new(&cfg, &fs, &runner, &mut console);

        let outcome = ProjectBootstrapStep.run(&mut ctx).unwrap();
        assert!(matches!(
            outcome,
            StepOutcome::Failed { kind: FailureKind::PresenceCheck, .. }
        ));
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn script_failure_is_reported() {
        let fs = MemoryFs::new();
        fs.put("/home/dev/agent-os/scripts/project-install.sh", "#!/bin/sh\n");
        let runner = RecordingRunner::new().failing("project-install.sh", 3);
        let mut console = ScriptedConsole::new();
        let cfg = config();
        let mut ctx = StepContext::new(&cfg, &fs, &runner, &mut console);

        match ProjectBootstrapStep.run(&mut ctx).unwrap() {
            StepOutcome::Failed { kind, message } => {
                assert_eq!(kind, FailureKind::ExternalProcess);
                assert!(message.ends_with("exited with status 3"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
