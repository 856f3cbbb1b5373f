//! Read/modify/write access to the project's `composer.json`.
//!
//! The manifest is kept as a JSON object with its original key order, so
//! every key this crate does not understand survives a rewrite untouched.
//! Writes always replace the whole file; nothing is patched textually.

use crate::error::{InstallerError, Result};
use crate::fs::{self, FileSystem};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const REQUIRE_DEV: &str = "require-dev";
pub const SCRIPTS: &str = "scripts";
pub const CONFIG: &str = "config";
pub const ALLOW_PLUGINS: &str = "allow-plugins";

// ---------------------------------------------------------------------------
// ProjectManifest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectManifest {
    doc: Map<String, Value>,
}

impl ProjectManifest {
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let value: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
        match value {
            Value::Object(doc) => Ok(Self { doc }),
            other => Err(format!("expected a JSON object, found {}", kind_of(&other))),
        }
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.doc.clone())
    }

    // -----------------------------------------------------------------------
    // require-dev
    // -----------------------------------------------------------------------

    /// Declared dev dependencies. A non-object `require-dev` reads as empty.
    pub fn dev_dependencies(&self) -> Vec<(&str, &str)> {
        self.doc
            .get(REQUIRE_DEV)
            .and_then(Value::as_object)
            .map(|deps| {
                deps.iter()
                    .map(|(name, constraint)| (name.as_str(), constraint.as_str().unwrap_or("")))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Presence by name only; version constraints are never inspected.
    pub fn has_dev_dependency(&self, package: &str) -> bool {
        self.doc
            .get(REQUIRE_DEV)
            .and_then(Value::as_object)
            .is_some_and(|deps| deps.get(package).is_some_and(|v| !v.is_null()))
    }

    /// The subset of `packages` not declared in `require-dev`, in input order.
    pub fn missing_dev_dependencies<'p>(&self, packages: &[&'p str]) -> Vec<&'p str> {
        packages
            .iter()
            .copied()
            .filter(|p| !self.has_dev_dependency(p))
            .collect()
    }

    pub fn add_dev_dependency(&mut self, package: &str, constraint: &str) {
        object_entry(&mut self.doc, REQUIRE_DEV)
            .insert(package.to_string(), Value::String(constraint.to_string()));
    }

    // -----------------------------------------------------------------------
    // scripts
    // -----------------------------------------------------------------------

    /// The raw declaration of a script, as written in the manifest.
    pub fn script(&self, name: &str) -> Option<&Value> {
        self.doc
            .get(SCRIPTS)
            .and_then(Value::as_object)
            .and_then(|scripts| scripts.get(name))
    }

    /// Script commands as an ordered list. A single-string script yields a
    /// one-element list; anything else non-string is skipped.
    pub fn script_commands(&self, name: &str) -> Option<Vec<String>> {
        match self.script(name)? {
            Value::String(s) => Some(vec![s.clone()]),
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// True when `name` is declared exactly as the ordered list `commands`.
    pub fn script_matches(&self, name: &str, commands: &[&str]) -> bool {
        let Some(Value::Array(items)) = self.script(name) else {
            return false;
        };
        items.len() == commands.len()
            && items
                .iter()
                .zip(commands)
                .all(|(have, want)| have.as_str() == Some(want))
    }

    pub fn script_names(&self) -> Vec<&str> {
        self.doc
            .get(SCRIPTS)
            .and_then(Value::as_object)
            .map(|scripts| scripts.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Declare `name` as exactly `commands`, replacing any prior definition.
    pub fn set_script(&mut self, name: &str, commands: &[&str]) {
        let list = commands
            .iter()
            .map(|c| Value::String((*c).to_string()))
            .collect();
        object_entry(&mut self.doc, SCRIPTS).insert(name.to_string(), Value::Array(list));
    }

    // -----------------------------------------------------------------------
    // config.allow-plugins
    // -----------------------------------------------------------------------

    fn allow_plugins(&self) -> Option<&Value> {
        self.doc.get(CONFIG).and_then(|config| config.get(ALLOW_PLUGINS))
    }

    /// Will composer run `plugin`? `"allow-plugins": true` allows every
    /// plugin; an explicit per-plugin entry counts whatever its value.
    pub fn allows_plugin(&self, plugin: &str) -> bool {
        match self.allow_plugins() {
            Some(Value::Bool(all)) => *all,
            Some(Value::Object(plugins)) => plugins.get(plugin).is_some_and(|v| !v.is_null()),
            _ => false,
        }
    }

    /// Add `plugin` to `config.allow-plugins`. A `config` or `allow-plugins`
    /// that is set to anything but an object is the user's and is never
    /// replaced.
    pub fn allow_plugin(&mut self, plugin: &str) -> PluginGrant {
        if self.allows_plugin(plugin) {
            return PluginGrant::AlreadyAllowed;
        }
        let config = self.doc.get(CONFIG).filter(|v| !v.is_null());
        let allow = self.allow_plugins().filter(|v| !v.is_null());
        if config.is_some_and(|v| !v.is_object()) || allow.is_some_and(|v| !v.is_object()) {
            return PluginGrant::Locked;
        }
        let config = object_entry(&mut self.doc, CONFIG);
        object_entry(config, ALLOW_PLUGINS).insert(plugin.to_string(), Value::Bool(true));
        PluginGrant::Added
    }
}

/// Result of [`ProjectManifest::allow_plugin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginGrant {
    Added,
    AlreadyAllowed,
    /// `allow-plugins` holds a non-list value (e.g. `false`) and was left alone.
    Locked,
}

/// Get `map[key]` as an object, replacing a missing or non-object value.
fn object_entry<'m>(map: &'m mut Map<String, Value>, key: &str) -> &'m mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(obj) => obj,
        _ => unreachable!("slot was just normalized to an object"),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serialize as composer does: 4-space indentation, unescaped slashes,
/// trailing newline.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

// ---------------------------------------------------------------------------
// ManifestInspector
// ---------------------------------------------------------------------------

pub struct ManifestInspector<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
}

impl<'a> ManifestInspector<'a> {
    pub fn new(fs: &'a dyn FileSystem, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the manifest fresh from disk. Never cached.
    pub fn read(&self) -> Result<ProjectManifest> {
        if !self.fs.exists(&self.path) {
            return Err(InstallerError::ManifestMissing(self.path.clone()));
        }
        let text = self
            .fs
            .read_to_string(&self.path)
            .map_err(|source| InstallerError::ManifestRead {
                path: self.path.clone(),
                source,
            })?;
        ProjectManifest::parse(&text).map_err(|reason| InstallerError::ManifestInvalid {
            path: self.path.clone(),
            reason,
        })
    }

    /// Overwrite the whole file with `manifest`.
    pub fn write(&self, manifest: &ProjectManifest) -> Result<()> {
        let data = to_pretty_json(&manifest.doc)?;
        debug!(path = %self.path.display(), "writing manifest");
        fs::write_file(self.fs, &self.path, &data)
    }

    /// Re-read the manifest, apply `change`, and write it back only if the
    /// parsed document differs. Returns whether a write happened.
    ///
    /// Re-reading here, rather than reusing an earlier snapshot, keeps edits
    /// made by a package-manager run earlier in the same step.
    pub fn update<F>(&self, change: F) -> Result<bool>
    where
        F: FnOnce(&mut ProjectManifest),
    {
        let before = self.read()?;
        let mut after = before.clone();
        change(&mut after);
        if after == before {
            return Ok(false);
        }
        self.write(&after)?;
        Ok(true)
    }
}
