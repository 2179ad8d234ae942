use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub action: ActionConfig,
    #[serde(default)]
    pub i18n: I18nConfig,
    #[serde(default)]
    pub connectors: ConnectorsConfig,
}

/// Toolbar presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    /// How long a temporary icon (love/unlove) stays before the permanent
    /// one is restored.
    #[serde(default = "default_temp_icon_duration_ms")]
    pub temp_icon_duration_ms: u64,
    /// Extension-relative directory holding toolbar icons.
    #[serde(default = "default_icon_dir")]
    pub icon_dir: String,
    /// Icon file prefix: `{icon_dir}/{icon_prefix}_{icon}_{size}.png`.
    #[serde(default = "default_icon_prefix")]
    pub icon_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I18nConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    /// `_locales` directory with `<locale>/messages.json` files.
    /// Built-in English titles are used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorsConfig {
    /// Connector registry (JSON array or TOML `[[connector]]` list).
    #[serde(default = "default_registry")]
    pub registry: PathBuf,
    /// Root that connector `js` paths are resolved against.
    #[serde(default = "default_src_root")]
    pub src_root: PathBuf,
}

impl ActionConfig {
    pub fn temp_icon_duration(&self) -> Duration {
        Duration::from_millis(self.temp_icon_duration_ms)
    }

    pub fn icon_path(&self, icon: &str, size: u32) -> String {
        format!(
            "{}/{}_{}_{}.png",
            self.icon_dir.trim_end_matches('/'),
            self.icon_prefix,
            icon,
            size
        )
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            temp_icon_duration_ms: default_temp_icon_duration_ms(),
            icon_dir: default_icon_dir(),
            icon_prefix: default_icon_prefix(),
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            messages_dir: None,
        }
    }
}

impl Default for ConnectorsConfig {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            src_root: default_src_root(),
        }
    }
}

fn default_temp_icon_duration_ms() -> u64 {
    5000
}

fn default_icon_dir() -> String {
    "/icons".to_string()
}

fn default_icon_prefix() -> String {
    "page_action".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_registry() -> PathBuf {
    PathBuf::from("src/core/connectors.json")
}

fn default_src_root() -> PathBuf {
    PathBuf::from("src")
}

impl Config {
    /// Load `path`, creating it with defaults when it does not exist yet.
    pub fn load_or_init(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
