//! Composer scripts that Agent OS commands and instructions invoke by name.
//!
//! Missing scripts are added silently. Scripts that exist with different
//! commands are conflicts: they are listed together and overwritten only
//! after a single confirmation covering the whole batch.

use crate::error::Result;
use crate::manifest::ProjectManifest;
use crate::pipeline::{FailureKind, Step, StepContext, StepOutcome};

const CONFIG_CLEAR: &str = "@php artisan config:clear --ansi";

pub const REQUIRED_SCRIPTS: &[(&str, &[&str])] = &[
    ("test", &[CONFIG_CLEAR, "@php artisan test"]),
    (
        "test-parallel",
        &[CONFIG_CLEAR, "@php artisan test --parallel --recreate-databases"],
    ),
    ("lint", &["vendor/bin/duster fix"]),
    ("rector", &["vendor/bin/rector"]),
    ("stan", &["vendor/bin/phpstan analyse --memory-limit=512M"]),
    (
        "ready",
        &[
            CONFIG_CLEAR,
            "@php artisan ide-helper:models --write",
            "composer rector",
            "composer lint",
            "composer stan",
            "composer test",
        ],
    ),
    (
        "report",
        &[
            "@php artisan config:clear --ansi || true",
            "@php artisan ide-helper:models --write || true",
            "composer rector || true",
            "composer lint || true",
            "composer stan || true",
            "composer test || true",
        ],
    ),
    (
        "coverage-html",
        &[
            "XDEBUG_MODE=coverage herd debug ./vendor/bin/pest --coverage-php coverage.php",
            "@php artisan generate-code-coverage-html",
        ],
    ),
    (
        "coverage",
        &["XDEBUG_MODE=coverage herd debug ./vendor/bin/pest --coverage"],
    ),
    ("types", &["vendor/bin/pest --type-coverage"]),
];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScriptPlan {
    /// Required scripts not declared at all.
    pub missing: Vec<&'static str>,
    /// Declared, but not exactly as required.
    pub conflicting: Vec<&'static str>,
}

impl ScriptPlan {
    pub fn for_manifest(manifest: &ProjectManifest) -> Self {
        let mut plan = Self::default();
        for &(name, commands) in REQUIRED_SCRIPTS {
            if manifest.script_matches(name, commands) {
                continue;
            }
            if manifest.script(name).is_some() {
                plan.conflicting.push(name);
            } else {
                plan.missing.push(name);
            }
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.conflicting.is_empty()
    }

    fn names(&self) -> impl Iterator<Item = &&'static str> {
        self.missing.iter().chain(&self.conflicting)
    }
}

pub struct ComposerScriptsStep;

impl Step for ComposerScriptsStep {
    fn name(&self) -> &'static str {
        "composer-scripts"
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let plan = ScriptPlan::for_manifest(&ctx.manifest().read()?);

        if plan.is_empty() {
            ctx.console
                .info("✓ All required Composer scripts are properly defined");
            return Ok(StepOutcome::done("all scripts defined"));
        }

        if !plan.conflicting.is_empty() {
            ctx.console.newline();
            ctx.console.warn(
                "The following Composer scripts are defined but differ from Agent OS requirements:",
            );
            for name in &plan.conflicting {
                ctx.console.line(&format!("  - {name}"));
            }
            ctx.console.newline();

            let overwrite = ctx.confirm(
                "Would you like to overwrite these scripts with Agent OS optimized versions?",
                true,
            )?;
            if !overwrite {
                ctx.console.newline();
                ctx.console
                    .error("Installation cannot continue without required Composer scripts.");
                ctx.console.line(
                    "Agent OS relies on these scripts being defined exactly as specified for proper operation.",
                );
                ctx.console
                    .line("The required scripts are used in agent-os commands and instructions.");
                return Ok(StepOutcome::failed(
                    FailureKind::UserDeclined,
                    format!("declined to overwrite {}", plan.conflicting.join(", ")),
                ));
            }
        }

        let names: Vec<&str> = plan.names().copied().collect();
        ctx.manifest().update(|manifest| {
            for &(name, commands) in REQUIRED_SCRIPTS {
                if names.contains(&name) {
                    manifest.set_script(name, commands);
                }
            }
        })?;

        ctx.console.info("✓ Composer scripts updated successfully");
        Ok(StepOutcome::done(format!("updated {}", names.join(", "))))
    }
}
