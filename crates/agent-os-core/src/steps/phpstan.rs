use super::PackageStep;
use crate::config::InstallerConfig;
use crate::error::Result;
use crate::paths;
use crate::reconcile::ToolConfig;
use serde::Serialize;

/// Level written into a freshly created `phpstan.neon`.
pub const DEFAULT_LEVEL: u32 = 6;

#[derive(Debug, Serialize)]
struct PhpStanNeon {
    includes: Vec<&'static str>,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    paths: Vec<&'static str>,
    exclude_paths: Vec<&'static str>,
    level: u32,
    treat_php_doc_types_as_certain: bool,
}

/// NEON is a YAML superset for everything written here.
pub fn render_defaults() -> Result<String> {
    let doc = PhpStanNeon {
        includes: vec!["./vendor/larastan/larastan/extension.neon"],
        parameters: Parameters {
            paths: vec!["app/"],
            exclude_paths: vec!["**/*Test.php"],
            level: DEFAULT_LEVEL,
            treat_php_doc_types_as_certain: false,
        },
    };
    Ok(serde_yaml::to_string(&doc)?)
}

fn tool_config(config: &InstallerConfig) -> Result<ToolConfig> {
    Ok(ToolConfig::threshold(
        paths::PHPSTAN_NEON,
        config.recommended_stan_level,
        render_defaults()?,
    ))
}

pub fn step() -> PackageStep {
    PackageStep {
        name: "phpstan",
        label: "PHPStan/Larastan",
        detect: &["larastan/larastan", "phpstan/phpstan"],
        install: &["larastan/larastan"],
        config: Some(tool_config),
        allow_plugin: None,
        ignore_entry: None,
    }
}
