use super::{run_pipeline, RunOptions};
use agent_os_core::pipeline::InstallPipeline;
use std::path::Path;

pub fn run(root: &Path, opts: RunOptions) -> anyhow::Result<i32> {
    run_pipeline(
        root,
        &InstallPipeline::optimize_reviews(),
        opts,
        "🔧 Optimizing Claude Code reviews...",
        "✅ Claude Code reviews optimized!",
    )
}
