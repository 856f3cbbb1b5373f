pub mod install;
pub mod optimize_reviews;

use crate::console::TerminalConsole;
use crate::output;
use agent_os_core::config::InstallerConfig;
use agent_os_core::console::Console;
use agent_os_core::fs::LocalFs;
use agent_os_core::pipeline::{InstallPipeline, StepContext};
use agent_os_core::runner::SystemRunner;
use anyhow::Context;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub assume_yes: bool,
    pub json: bool,
}

/// Load settings, run `pipeline` against the real disk and processes, and
/// print the summary. Returns the process exit code.
pub fn run_pipeline(
    root: &Path,
    pipeline: &InstallPipeline,
    opts: RunOptions,
    heading: &str,
    done: &str,
) -> anyhow::Result<i32> {
    let mut config = InstallerConfig::load(root)
        .with_context(|| format!("failed to load installer settings from {}", root.display()))?;
    config.assume_yes = opts.assume_yes;

    let mut console = TerminalConsole::new(opts.json);
    console.info(heading);
    console.newline();

    let fs = LocalFs;
    let runner = SystemRunner;
    let result = {
        let mut ctx = StepContext::new(&config, &fs, &runner, &mut console);
        pipeline.run(&mut ctx)
    };

    output::print_summary(&result, opts.json)?;

    console.newline();
    match result.failed_step() {
        None => console.info(done),
        Some(failed) => console.error(&format!(
            "✗ Stopped at '{}': {}",
            failed.step, failed.message
        )),
    }
    Ok(result.exit_code())
}
