use agent_os_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `AGENT_OS_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of `start` holding a `composer.json`
/// 3. Nearest ancestor of `start` holding a `.git/` directory
/// 4. `start` itself
pub fn resolve_root(explicit: Option<&Path>, start: &Path) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    find_upward(start, |dir| dir.join(paths::COMPOSER_JSON).is_file())
        .or_else(|| find_upward(start, |dir| dir.join(".git").is_dir()))
        .unwrap_or_else(|| start.to_path_buf())
}

fn find_upward(start: &Path, matches: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start.ancestors().find(|dir| matches(dir)).map(Path::to_path_buf)
}
