use super::{run_pipeline, RunOptions};
use agent_os_core::pipeline::InstallPipeline;
use std::path::Path;

pub fn run(root: &Path, opts: RunOptions) -> anyhow::Result<i32> {
    run_pipeline(
        root,
        &InstallPipeline::install(),
        opts,
        "🚀 Installing Agent OS and code quality tools...",
        "✅ Installation complete!",
    )
}
