use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Project-relative file constants
// ---------------------------------------------------------------------------

pub const COMPOSER_JSON: &str = "composer.json";
pub const GITIGNORE: &str = ".gitignore";
pub const INSTALLER_CONFIG_FILE: &str = "agent-os-installer.yaml";

pub const PINT_JSON: &str = "pint.json";
pub const PHPSTAN_NEON: &str = "phpstan.neon";
pub const RECTOR_PHP: &str = "rector.php";
pub const PHPCS_XML: &str = "phpcs.xml";
pub const ENLIGHTN_CONFIG: &str = "config/enlightn.php";

pub const PHPCS_CACHE: &str = ".phpcs.cache";

pub const CLAUDE_WORKFLOW: &str = ".github/claude.yml";
pub const CLAUDE_REVIEW_WORKFLOW: &str = ".github/claude-code-review.yml";

// ---------------------------------------------------------------------------
// Agent OS layout under the home directory
// ---------------------------------------------------------------------------

pub const PROFILES_DIR: &str = "profiles";
pub const PROJECT_INSTALL_SCRIPT: &str = "scripts/project-install.sh";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(COMPOSER_JSON)
}

pub fn gitignore_path(root: &Path) -> PathBuf {
    root.join(GITIGNORE)
}

pub fn installer_config_path(root: &Path) -> PathBuf {
    root.join(INSTALLER_CONFIG_FILE)
}

pub fn profiles_dir(agent_os_dir: &Path) -> PathBuf {
    agent_os_dir.join(PROFILES_DIR)
}

pub fn profile_dir(agent_os_dir: &Path, profile: &str) -> PathBuf {
    profiles_dir(agent_os_dir).join(profile)
}

pub fn project_install_script(agent_os_dir: &Path) -> PathBuf {
    agent_os_dir.join(PROJECT_INSTALL_SCRIPT)
}
