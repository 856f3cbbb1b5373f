//! Create-or-merge logic for tool configuration files.
//!
//! | format     | file absent        | file present                                   |
//! |------------|--------------------|------------------------------------------------|
//! | Structured | write defaults     | add missing keys, merge one nested map         |
//! | Threshold  | write defaults     | read the level, warn when below the floor      |
//! | Template   | write defaults     | untouched                                      |
//!
//! Existing values always win. Nothing here ever deletes a file.

use crate::error::Result;
use crate::fs::{self, FileSystem};
use crate::manifest::to_pretty_json;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

// ---------------------------------------------------------------------------
// ToolConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON object. `nested` names the one sub-map whose missing entries are
    /// merged individually.
    Structured { nested: Option<&'static str> },
    /// Written once; afterwards only its `level:` setting is inspected.
    Threshold { floor: u32 },
    /// Opaque text. Existence alone is enough.
    Template,
}

#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Relative to the project root.
    pub path: &'static str,
    pub format: ConfigFormat,
    pub defaults: String,
}

impl ToolConfig {
    pub fn structured(path: &'static str, nested: Option<&'static str>, defaults: &Value) -> Result<Self> {
        let bytes = to_pretty_json(defaults)?;
        Ok(Self {
            path,
            format: ConfigFormat::Structured { nested },
            defaults: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    pub fn threshold(path: &'static str, floor: u32, defaults: impl Into<String>) -> Self {
        Self {
            path,
            format: ConfigFormat::Threshold { floor },
            defaults: defaults.into(),
        }
    }

    pub fn template(path: &'static str, defaults: impl Into<String>) -> Self {
        Self {
            path,
            format: ConfigFormat::Template,
            defaults: defaults.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Created,
    Merged,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    LevelBelowFloor { level: u32, floor: u32 },
    /// The existing file could not be parsed, so it was left alone.
    Unparseable { reason: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::LevelBelowFloor { level, floor } => write!(
                f,
                "level is currently set to {level}. We recommend level {floor} or higher \
                 when using LLM code generation to ensure proper typing."
            ),
            ConfigWarning::Unparseable { reason } => {
                write!(f, "could not be parsed ({reason}); leaving it unchanged")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub status: Reconciliation,
    pub warning: Option<ConfigWarning>,
}

impl Reconciled {
    fn plain(status: Reconciliation) -> Self {
        Self {
            status,
            warning: None,
        }
    }

    fn warned(warning: ConfigWarning) -> Self {
        Self {
            status: Reconciliation::Unchanged,
            warning: Some(warning),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigFileReconciler
// ---------------------------------------------------------------------------

pub struct ConfigFileReconciler<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
}

impl<'a> ConfigFileReconciler<'a> {
    pub fn new(fs: &'a dyn FileSystem, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    pub fn ensure(&self, config: &ToolConfig) -> Result<Reconciled> {
        let path = self.root.join(config.path);

        if fs::write_if_missing(self.fs, &path, config.defaults.as_bytes())? {
            debug!(path = %path.display(), "created from defaults");
            return Ok(Reconciled::plain(Reconciliation::Created));
        }

        match &config.format {
            ConfigFormat::Template => Ok(Reconciled::plain(Reconciliation::Unchanged)),
            ConfigFormat::Threshold { floor } => self.check_threshold(&path, *floor),
            ConfigFormat::Structured { nested } => self.merge_structured(&path, config, *nested),
        }
    }

    fn check_threshold(&self, path: &Path, floor: u32) -> Result<Reconciled> {
        let content = self.fs.read_to_string(path)?;
        match extract_level(&content) {
            Some(level) if level < floor => {
                Ok(Reconciled::warned(ConfigWarning::LevelBelowFloor { level, floor }))
            }
            _ => Ok(Reconciled::plain(Reconciliation::Unchanged)),
        }
    }

    fn merge_structured(
        &self,
        path: &Path,
        config: &ToolConfig,
        nested: Option<&str>,
    ) -> Result<Reconciled> {
        let content = self.fs.read_to_string(path)?;
        let existing = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Ok(Reconciled::warned(ConfigWarning::Unparseable {
                    reason: "expected a JSON object".to_string(),
                }))
            }
            Err(e) => {
                return Ok(Reconciled::warned(ConfigWarning::Unparseable {
                    reason: e.to_string(),
                }))
            }
        };
        let defaults = match serde_json::from_str::<Value>(&config.defaults)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let mut merged = existing.clone();
        merge_missing(&mut merged, &defaults, nested);

        // Parsed-value equality: reformatting alone never triggers a rewrite.
        if merged == existing {
            return Ok(Reconciled::plain(Reconciliation::Unchanged));
        }
        let data = to_pretty_json(&merged)?;
        fs::write_file(self.fs, path, &data)?;
        debug!(path = %path.display(), "merged missing defaults");
        Ok(Reconciled::plain(Reconciliation::Merged))
    }
}

/// Copy every key of `defaults` missing from `target`. For the `nested` key,
/// copy missing sub-keys instead, leaving existing sub-values alone.
pub fn merge_missing(target: &mut Map<String, Value>, defaults: &Map<String, Value>, nested: Option<&str>) {
    for (key, default) in defaults {
        let is_nested = nested == Some(key.as_str());
        match target.get_mut(key) {
            None => {
                target.insert(key.clone(), default.clone());
            }
            Some(existing) if is_nested => {
                // An empty list is how PHP tooling serializes an empty map.
                if existing.as_array().is_some_and(Vec::is_empty) {
                    *existing = Value::Object(Map::new());
                }
                if let (Value::Object(have), Value::Object(want)) = (existing, default) {
                    for (sub, value) in want {
                        if !have.contains_key(sub) {
                            have.insert(sub.clone(), value.clone());
                        }
                    }
                }
            }
            Some(_) => {}
        }
    }
}

static LEVEL_RE: OnceLock<Regex> = OnceLock::new();

fn level_re() -> &'static Regex {
    LEVEL_RE.get_or_init(|| Regex::new(r"(?m)^\s*level:\s*(\d+)").unwrap())
}

/// First `level: <n>` setting in a NEON/YAML document, read textually so
/// glob patterns elsewhere in the file never trip a parser.
pub fn extract_level(content: &str) -> Option<u32> {
    level_re()
        .captures(content)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryFs;
    use serde_json::json;

    fn pint() -> ToolConfig {
        ToolConfig::structured(
            "pint.json",
            Some("rules"),
            &json!({
                "preset": "laravel",
                "rules": {
                    "declare_strict_types": true,
                    "array_syntax": true
                }
            }),
        )
        .unwrap()
    }

    fn reconciler(fs: &MemoryFs) -> ConfigFileReconciler<'_> {
        ConfigFileReconciler::new(fs, "/app")
    }

    #[test]
    fn absent_file_is_created_verbatim() {
        let fs = MemoryFs::new();
        let cfg = ToolConfig::template("rector.php", "<?php\nreturn [];\n");
        let result = reconciler(&fs).ensure(&cfg).unwrap();
        assert_eq!(result.status, Reconciliation::Created);
        assert_eq!(fs.get("/app/rector.php").unwrap(), "<?php\nreturn [];\n");
    }

    #[test]
    fn template_is_never_modified() {
        let fs = MemoryFs::new();
        fs.put("/app/phpcs.xml", "<ruleset name=\"mine\"/>  \n\n");
        let cfg = ToolConfig::template("phpcs.xml", "<ruleset/>");
        let result = reconciler(&fs).ensure(&cfg).unwrap();
        assert_eq!(result.status, Reconciliation::Unchanged);
        assert_eq!(fs.get("/app/phpcs.xml").unwrap(), "<ruleset name=\"mine\"/>  \n\n");
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn structured_merge_keeps_custom_values() {
        let fs = MemoryFs::new();
        fs.put(
            "/app/pint.json",
            r#"{"preset": "psr12", "rules": {"array_syntax": false, "my_rule": true}, "exclude": ["legacy"]}"#,
        );
        let result = reconciler(&fs).ensure(&pint()).unwrap();
        assert_eq!(result.status, Reconciliation::Merged);

        let merged: Value = serde_json::from_str(&fs.get("/app/pint.json").unwrap()).unwrap();
        assert_eq!(merged["preset"], json!("psr12"));
        assert_eq!(merged["exclude"], json!(["legacy"]));
        assert_eq!(merged["rules"]["array_syntax"], json!(false));
        assert_eq!(merged["rules"]["my_rule"], json!(true));
        assert_eq!(merged["rules"]["declare_strict_types"], json!(true));
    }

    #[test]
    fn structured_adds_missing_preset_and_rules() {
        let fs = MemoryFs::new();
        fs.put("/app/pint.json", "{}");
        reconciler(&fs).ensure(&pint()).unwrap();
        let merged: Value = serde_json::from_str(&fs.get("/app/pint.json").unwrap()).unwrap();
        assert_eq!(
            merged,
            json!({"preset": "laravel", "rules": {"declare_strict_types": true, "array_syntax": true}})
        );
    }

    #[test]
    fn empty_rules_list_is_treated_as_map() {
        let fs = MemoryFs::new();
        fs.put("/app/pint.json", r#"{"preset": "laravel", "rules": []}"#);
        let result = reconciler(&fs).ensure(&pint()).unwrap();
        assert_eq!(result.status, Reconciliation::Merged);
        let merged: Value = serde_json::from_str(&fs.get("/app/pint.json").unwrap()).unwrap();
        assert_eq!(merged["rules"]["array_syntax"], json!(true));
    }

    #[test]
    fn formatting_differences_do_not_rewrite() {
        let fs = MemoryFs::new();
        let compact = r#"{"rules":{"array_syntax":true,"declare_strict_types":true},"preset":"laravel"}"#;
        fs.put("/app/pint.json", compact);
        let result = reconciler(&fs).ensure(&pint()).unwrap();
        assert_eq!(result.status, Reconciliation::Unchanged);
        assert_eq!(fs.get("/app/pint.json").unwrap(), compact);
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn unparseable_structured_file_is_left_alone() {
        let fs = MemoryFs::new();
        fs.put("/app/pint.json", "{ broken");
        let result = reconciler(&fs).ensure(&pint()).unwrap();
        assert_eq!(result.status, Reconciliation::Unchanged);
        assert!(matches!(result.warning, Some(ConfigWarning::Unparseable { .. })));
        assert_eq!(fs.get("/app/pint.json").unwrap(), "{ broken");
    }

    #[test]
    fn low_level_warns_without_mutation() {
        let fs = MemoryFs::new();
        let existing = "parameters:\n    paths:\n        - app/\n    level: 3\n";
        fs.put("/app/phpstan.neon", existing);
        let cfg = ToolConfig::threshold("phpstan.neon", 5, "parameters:\n    level: 6\n");
        let result = reconciler(&fs).ensure(&cfg).unwrap();
        assert_eq!(result.status, Reconciliation::Unchanged);
        assert_eq!(
            result.warning,
            Some(ConfigWarning::LevelBelowFloor { level: 3, floor: 5 })
        );
        assert_eq!(fs.get("/app/phpstan.neon").unwrap(), existing);
    }

    #[test]
    fn acceptable_or_missing_level_is_quiet() {
        let fs = MemoryFs::new();
        let cfg = ToolConfig::threshold("phpstan.neon", 5, "");
        fs.put("/app/phpstan.neon", "parameters:\n    level: max\n");
        assert_eq!(reconciler(&fs).ensure(&cfg).unwrap().warning, None);
        fs.put("/app/phpstan.neon", "parameters:\n    level: 8\n");
        assert_eq!(reconciler(&fs).ensure(&cfg).unwrap().warning, None);
    }

    #[test]
    fn extract_level_reads_first_match() {
        assert_eq!(extract_level("level: 6"), Some(6));
        assert_eq!(extract_level("parameters:\n  excludePaths:\n    - **/*Test.php\n  level: 4\n"), Some(4));
        assert_eq!(extract_level("parameters:\n  paths: [app]\n"), None);
    }
}
