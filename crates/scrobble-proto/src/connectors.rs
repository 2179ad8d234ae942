//! Connector registry loading and validation.
//!
//! A registry lists the site connectors the extension can inject. Each entry
//! must carry a `label` and a list of `js` files (relative to the source
//! root); `id`, `matches` and `allFrames` are optional and nothing else is
//! allowed.
//!
//! Checks run on the raw JSON values so that one malformed entry produces a
//! precise diagnostic instead of failing the whole file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const REQUIRED_PROPS: &[&str] = &["label", "js"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropType {
    String,
    Array,
    Boolean,
}

impl PropType {
    fn of(prop: &str) -> Option<Self> {
        match prop {
            "label" | "id" => Some(PropType::String),
            "js" | "matches" => Some(PropType::Array),
            "allFrames" => Some(PropType::Boolean),
            _ => None,
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            PropType::String => value.is_string(),
            PropType::Array => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            PropType::Boolean => value.is_boolean(),
        }
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropType::String => "string",
            PropType::Array => "array of strings",
            PropType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// A registry entry that passed the property checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ConnectorEntry {
    pub label: String,
    pub js: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_frames: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Entry is not an object")]
    NotAnObject,
    #[error("Malformed entry: {0}")]
    Malformed(String),
    #[error("Missing property: {0}")]
    MissingProperty(String),
    #[error("Unknown property: {0}")]
    UnknownProperty(String),
    #[error("Invalid property type: {prop} (expected {expected})")]
    InvalidType { prop: String, expected: PropType },
    #[error("Path is not relative: {0}")]
    AbsolutePath(String),
    #[error("File is missing: {0}")]
    MissingFile(String),
    #[error("Id is not unique: {label} (shared with {other})")]
    DuplicateId { label: String, other: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON registry {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid TOML registry {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("registry {0} is not a list of entries")]
    NotAList(PathBuf),
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// TOML layout: a list of `[[connector]]` tables.
#[derive(Debug, Deserialize)]
struct TomlRegistryFile {
    #[serde(default)]
    connector: Vec<Value>,
}

/// Load raw registry entries from a JSON array or a TOML `[[connector]]` file.
pub fn load_registry(path: &Path) -> Result<Vec<Value>, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let entries = if is_toml {
        parse_registry_toml(&content).map_err(|source| LoadError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        let value: Value = serde_json::from_str(&content).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        match value {
            Value::Array(entries) => entries,
            _ => return Err(LoadError::NotAList(path.to_path_buf())),
        }
    };

    debug!("Loaded {} connector entries from {:?}", entries.len(), path);
    Ok(entries)
}

pub fn parse_registry_toml(content: &str) -> Result<Vec<Value>, toml::de::Error> {
    // Tables deserialize straight into JSON values, so every entry reaches
    // validation; TOML-only values (non-finite floats) become null.
    let file: TomlRegistryFile = toml::from_str(content)?;
    Ok(file.connector)
}

// ── Checks ────────────────────────────────────────────────────────────────────

fn as_object(entry: &Value) -> Result<&Map<String, Value>, RegistryError> {
    entry.as_object().ok_or(RegistryError::NotAnObject)
}

/// A required property is missing when absent, null, `false` or an empty
/// string.
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Required properties present, no unknown properties, every property of the
/// right type.
pub fn validate_props(entry: &Value) -> Result<ConnectorEntry, RegistryError> {
    let obj = as_object(entry)?;

    for prop in REQUIRED_PROPS {
        if is_missing(obj.get(*prop)) {
            return Err(RegistryError::MissingProperty(prop.to_string()));
        }
    }

    for (prop, value) in obj {
        let expected =
            PropType::of(prop).ok_or_else(|| RegistryError::UnknownProperty(prop.clone()))?;
        if !expected.accepts(value) {
            return Err(RegistryError::InvalidType {
                prop: prop.clone(),
                expected,
            });
        }
    }

    // The checks above mirror the struct shape exactly.
    serde_json::from_value(entry.clone()).map_err(|e| RegistryError::Malformed(e.to_string()))
}

/// Every `js` path exists under `src_root`.
pub fn validate_paths(entry: &Value, src_root: &Path) -> Result<(), RegistryError> {
    let obj = as_object(entry)?;
    let js = obj
        .get("js")
        .ok_or_else(|| RegistryError::MissingProperty("js".to_string()))?;
    let files = js.as_array().ok_or_else(|| RegistryError::InvalidType {
        prop: "js".to_string(),
        expected: PropType::Array,
    })?;

    for file in files {
        let rel = file.as_str().ok_or_else(|| RegistryError::InvalidType {
            prop: "js".to_string(),
            expected: PropType::Array,
        })?;
        if Path::new(rel).is_absolute() {
            return Err(RegistryError::AbsolutePath(rel.to_string()));
        }
        if std::fs::metadata(src_root.join(rel)).is_err() {
            return Err(RegistryError::MissingFile(rel.to_string()));
        }
    }
    Ok(())
}

fn str_prop<'a>(entry: &'a Value, prop: &str) -> Option<&'a str> {
    entry.get(prop).and_then(Value::as_str)
}

/// No other entry with a different label shares this entry's `id`.
/// Entries without an id (or with an empty one) never clash.
pub fn validate_uniqueness(entry: &Value, all: &[Value]) -> Result<(), RegistryError> {
    as_object(entry)?;
    let label = str_prop(entry, "label").unwrap_or_default();
    let Some(id) = str_prop(entry, "id").filter(|id| !id.is_empty()) else {
        return Ok(());
    };

    for other in all {
        let other_label = str_prop(other, "label").unwrap_or_default();
        if other_label == label {
            continue;
        }
        if str_prop(other, "id") == Some(id) {
            return Err(RegistryError::DuplicateId {
                label: label.to_string(),
                other: other_label.to_string(),
            });
        }
    }
    Ok(())
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Props,
    Paths,
    Uniqueness,
}

impl Check {
    /// Human-readable description, phrased like a test case name.
    pub fn describe(self, label: &str) -> String {
        match self {
            Check::Props => format!("should have valid properties for {}", label),
            Check::Paths => format!("should have js files for {}", label),
            Check::Uniqueness => format!("should have unique id {}", label),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub label: String,
    pub check: Check,
    pub outcome: Result<(), RegistryError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryReport {
    pub results: Vec<CheckResult>,
}

impl RegistryReport {
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| r.outcome.is_err())
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_ok()).count()
    }

    pub fn is_ok(&self) -> bool {
        self.failures().next().is_none()
    }
}

fn entry_label(entry: &Value, index: usize) -> String {
    str_prop(entry, "label")
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", index))
}

/// Run every check against every entry.
pub fn validate_registry(entries: &[Value], src_root: &Path) -> RegistryReport {
    let mut results = Vec::with_capacity(entries.len() * 3);

    for (index, entry) in entries.iter().enumerate() {
        let label = entry_label(entry, index);
        let outcomes = [
            (Check::Props, validate_props(entry).map(|_| ())),
            (Check::Paths, validate_paths(entry, src_root)),
            (Check::Uniqueness, validate_uniqueness(entry, entries)),
        ];
        for (check, outcome) in outcomes {
            if let Err(e) = &outcome {
                warn!("{}: {}", check.describe(&label), e);
            }
            results.push(CheckResult {
                label: label.clone(),
                check,
                outcome,
            });
        }
    }

    RegistryReport { results }
}
