use super::PackageStep;
use crate::config::InstallerConfig;
use crate::error::Result;
use crate::paths;
use crate::reconcile::ToolConfig;
use serde_json::{json, Value};

pub fn defaults() -> Value {
    json!({
        "preset": "laravel",
        "rules": {
            "declare_strict_types": true,
            "fully_qualified_strict_types": true,
            "single_trait_insert_per_statement": true,
            "array_syntax": true
        }
    })
}

fn tool_config(_: &InstallerConfig) -> Result<ToolConfig> {
    ToolConfig::structured(paths::PINT_JSON, Some("rules"), &defaults())
}

pub fn step() -> PackageStep {
    PackageStep {
        name: "pint",
        label: "Laravel Pint",
        detect: &["laravel/pint"],
        install: &["laravel/pint"],
        config: Some(tool_config),
        allow_plugin: None,
        ignore_entry: None,
    }
}
