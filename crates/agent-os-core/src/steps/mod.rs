//! One module per provisioning step.
//!
//! Most tool steps are a [`PackageStep`]: a declarative description of which
//! dev dependencies count as "installed", what to `composer require` when
//! they are not, and which config file to reconcile afterwards.

pub mod agent_os;
pub mod bootstrap;
pub mod claude_app;
pub mod code_sniffer;
pub mod dev_tools;
pub mod duster;
pub mod enlightn;
pub mod github_cli;
pub mod pest;
pub mod phpstan;
pub mod pint;
pub mod rector;
pub mod scripts;

use crate::config::InstallerConfig;
use crate::error::Result;
use crate::fs::{self, IgnoreEntry};
use crate::manifest::{PluginGrant, ProjectManifest};
use crate::paths;
use crate::pipeline::{describe_failure, FailureKind, Step, StepContext, StepOutcome};
use crate::reconcile::ToolConfig;
use tracing::debug;

/// Builds a tool's config description from the installer settings.
pub type ConfigBuilder = fn(&InstallerConfig) -> Result<ToolConfig>;

#[derive(Clone)]
pub struct PackageStep {
    pub name: &'static str,
    /// Shown to the user, e.g. "Laravel Pint".
    pub label: &'static str,
    /// Any one of these in `require-dev` counts as installed.
    pub detect: &'static [&'static str],
    pub install: &'static [&'static str],
    pub config: Option<ConfigBuilder>,
    /// Composer plugin that must be allowed before installing and stay
    /// allowed in the manifest afterwards.
    pub allow_plugin: Option<&'static str>,
    /// Line the project's `.gitignore` must contain, if it has one.
    pub ignore_entry: Option<&'static str>,
}

impl PackageStep {
    pub fn is_installed(&self, manifest: &ProjectManifest) -> bool {
        self.detect.iter().any(|p| manifest.has_dev_dependency(p))
    }

    fn allow_plugin_command(&self, ctx: &mut StepContext<'_>, plugin: &str) -> Result<Option<StepOutcome>> {
        let command = ctx
            .project_command("composer", ctx.config.config_timeout())
            .args(["config", "--no-plugins"])
            .arg(format!("allow-plugins.{plugin}"))
            .arg("true");
        let outcome = ctx.run_streamed(&command)?;
        if outcome.success {
            return Ok(None);
        }
        ctx.console
            .error(&format!("Failed to allow {plugin} plugin"));
        Ok(Some(StepOutcome::failed(
            FailureKind::ExternalProcess,
            describe_failure(&command, &outcome),
        )))
    }
}

impl Step for PackageStep {
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let mut notes = Vec::new();
        let manifest = ctx.manifest().read()?;

        if self.is_installed(&manifest) {
            ctx.console
                .info(&format!("✓ {} is already installed", self.label));
            notes.push("already installed".to_string());
        } else {
            debug!(step = self.name, packages = ?self.install, "installing");
            ctx.console.info(&format!("Installing {}...", self.label));

            if let Some(plugin) = self.allow_plugin {
                // Only when the manifest would take a per-plugin entry.
                if manifest.clone().allow_plugin(plugin) == PluginGrant::Added {
                    if let Some(failed) = self.allow_plugin_command(ctx, plugin)? {
                        return Ok(failed);
                    }
                }
            }

            let command = ctx.require_dev_command(self.install);
            let outcome = ctx.run_streamed(&command)?;
            if !outcome.success {
                ctx.console
                    .error(&format!("Failed to install {}", self.label));
                return Ok(StepOutcome::failed(
                    FailureKind::ExternalProcess,
                    describe_failure(&command, &outcome),
                ));
            }
            ctx.console
                .info(&format!("✓ {} installed successfully", self.label));
            notes.push("installed".to_string());
        }

        if let Some(build) = self.config {
            let tool = build(ctx.config)?;
            notes.push(ctx.ensure_config(&tool)?);
        }

        if let Some(entry) = self.ignore_entry {
            let path = paths::gitignore_path(&ctx.config.root);
            match fs::ensure_ignore_entry(ctx.fs, &path, entry)? {
                IgnoreEntry::Added => {
                    ctx.console
                        .info(&format!("✓ Added {entry} to .gitignore"));
                    notes.push(format!("{entry} ignored"));
                }
                IgnoreEntry::AlreadyPresent => {
                    ctx.console
                        .info(&format!("✓ .gitignore already includes {entry}"));
                }
                IgnoreEntry::NoIgnoreFile => {}
            }
        }

        if let Some(plugin) = self.allow_plugin {
            let mut grant = PluginGrant::AlreadyAllowed;
            ctx.manifest().update(|m| grant = m.allow_plugin(plugin))?;
            match grant {
                PluginGrant::Added => {
                    ctx.console
                        .info(&format!("✓ Added {plugin} to composer.json allow-plugins"));
                    notes.push("plugin allowed".to_string());
                }
                PluginGrant::AlreadyAllowed => {
                    ctx.console
                        .info(&format!("✓ composer.json already allows {plugin}"));
                }
                PluginGrant::Locked => {
                    ctx.console.warn(&format!(
                        "⚠ composer.json config.allow-plugins is not a list of plugins; left unchanged. Allow {plugin} there if composer skips it."
                    ));
                    notes.push("allow-plugins left unchanged".to_string());
                }
            }
        }

        Ok(StepOutcome::done(notes.join("; ")))
    }
}
