use super::PackageStep;
use crate::config::InstallerConfig;
use crate::error::Result;
use crate::paths;
use crate::reconcile::ToolConfig;

pub const DEFAULT_CONFIG: &str = r#"<?php

declare(strict_types=1);

use Rector\Config\RectorConfig;
use RectorLaravel\Set\LaravelLevelSetList;
use RectorLaravel\Set\LaravelSetList;

return RectorConfig::configure()
    ->withPaths([
        __DIR__.'/app',
        __DIR__.'/bootstrap',
        __DIR__.'/config',
        __DIR__.'/public',
        __DIR__.'/resources',
        __DIR__.'/routes',
        __DIR__.'/tests',
        __DIR__.'/database',
    ])
    ->withPhpSets(php84: true)
    ->withSets([
        LaravelLevelSetList::UP_TO_LARAVEL_120,
        LaravelSetList::LARAVEL_CODE_QUALITY,
        LaravelSetList::LARAVEL_COLLECTION,
    ])
    ->withTypeCoverageLevel(1)
    ->withDeadCodeLevel(1)
    ->withCodeQualityLevel(1)
    ->withImportNames(
        importShortClasses: false,
        removeUnusedImports: true,
    );
"#;

fn tool_config(_: &InstallerConfig) -> Result<ToolConfig> {
    Ok(ToolConfig::template(paths::RECTOR_PHP, DEFAULT_CONFIG))
}

pub fn step() -> PackageStep {
    PackageStep {
        name: "rector",
        label: "Rector",
        detect: &["rector/rector"],
        install: &["rector/rector", "driftingly/rector-laravel"],
        config: Some(tool_config),
        allow_plugin: None,
        ignore_entry: None,
    }
}
