//! Localized toolbar titles.
//!
//! Locale files use the WebExtension `messages.json` layout:
//!
//! ```json
//! { "pageActionLoved": { "message": "Loved $SONG$", "placeholders": { "song": { "content": "$1" } } } }
//! ```
//!
//! Lookups never fail: a key missing from the loaded locale falls back to the
//! built-in English message, then to the key itself.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::I18nConfig;

/// Title lookup used by the toolbar presenter.
pub trait Localize {
    /// Resolve `key`, substituting `placeholder` for `$1`.
    fn message(&self, key: &str, placeholder: Option<&str>) -> String;
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid messages file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct MessageEntry {
    message: String,
    #[serde(default)]
    placeholders: HashMap<String, PlaceholderEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlaceholderEntry {
    content: String,
}

const BUILTIN_EN: &[(&str, &str)] = &[
    ("pageActionBase", "This website is supported for scrobbling"),
    ("pageActionLoading", "Looking up the current track"),
    ("pageActionRecognized", "Now playing: $1"),
    ("pageActionScrobbled", "Scrobbled: $1"),
    ("pageActionSkipped", "Skipped: $1"),
    ("pageActionIgnored", "Ignored by the scrobbling service: $1"),
    ("pageActionDisabled", "The connector for this website is disabled"),
    ("pageActionUnknown", "The current track is not recognized"),
    ("pageActionError", "Scrobbling failed, see the popup for details"),
    ("pageActionLoved", "Loved: $1"),
    ("pageActionUnloved", "Unloved: $1"),
    ("pageActionUnsupported", "This website is not supported"),
];

#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: HashMap<String, MessageEntry>,
}

impl MessageCatalog {
    /// Built-in English titles for every toolbar mode.
    pub fn builtin() -> Self {
        let messages = BUILTIN_EN
            .iter()
            .map(|(key, message)| {
                (
                    key.to_string(),
                    MessageEntry {
                        message: message.to_string(),
                        placeholders: HashMap::new(),
                    },
                )
            })
            .collect();
        Self { messages }
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        let messages: HashMap<String, MessageEntry> = serde_json::from_str(content)?;
        Ok(Self { messages })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&content).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded {} messages from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Load `<messages_dir>/<locale>/messages.json` layered over the
    /// built-in catalog. A missing or broken locale file leaves the built-in
    /// messages in place.
    pub fn load_locale(messages_dir: &Path, locale: &str) -> Self {
        let mut catalog = Self::builtin();
        let path = messages_dir.join(locale).join("messages.json");
        match Self::load(&path) {
            Ok(localized) => catalog.messages.extend(localized.messages),
            Err(e) => warn!("Using built-in messages: {}", e),
        }
        catalog
    }

    /// Catalog for the configured locale, or the built-in one when no
    /// messages directory is configured.
    pub fn from_config(config: &I18nConfig) -> Self {
        match &config.messages_dir {
            Some(dir) => Self::load_locale(dir, &config.locale),
            None => Self::builtin(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }
}

impl Localize for MessageCatalog {
    fn message(&self, key: &str, placeholder: Option<&str>) -> String {
        match self.messages.get(key) {
            Some(entry) => format_message(entry, placeholder),
            None => {
                debug!("No message for key {}", key);
                BUILTIN_EN
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, message)| expand(message, &HashMap::new(), placeholder))
                    .unwrap_or_else(|| key.to_string())
            }
        }
    }
}

fn format_message(entry: &MessageEntry, placeholder: Option<&str>) -> String {
    expand(&entry.message, &entry.placeholders, placeholder)
}

/// One pass over `text`: `$$` becomes `$`, `$1` the placeholder and `$NAME$`
/// (case-insensitive) the named placeholder's content. Inserted text is never
/// scanned again.
fn expand(
    text: &str,
    named: &HashMap<String, PlaceholderEntry>,
    placeholder: Option<&str>,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
            continue;
        }
        if let Some(tail) = after.strip_prefix('1') {
            out.push_str(placeholder.unwrap_or(""));
            rest = tail;
            continue;
        }
        if let Some(end) = after.find('$') {
            if let Some(ph) = lookup_named(named, &after[..end]) {
                // Contents come from the catalog and may only refer to `$1`.
                out.push_str(&expand(&ph.content, &HashMap::new(), placeholder));
                rest = &after[end + 1..];
                continue;
            }
        }
        out.push('$');
        rest = after;
    }
    out.push_str(rest);
    out
}

fn lookup_named<'a>(
    named: &'a HashMap<String, PlaceholderEntry>,
    name: &str,
) -> Option<&'a PlaceholderEntry> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    named
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, ph)| ph)
}
