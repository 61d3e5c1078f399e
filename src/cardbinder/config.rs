use crate::error::Result;
use crate::history::DEFAULT_MAX_HISTORY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_LOOKUP_URL: &str = "https://api.pokemontcg.io/v2/cards";
const DEFAULT_PLACEHOLDER_URL: &str = "https://placehold.co/150x210/cccccc/333333";

/// Configuration for the binder, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BinderConfig {
    /// Grid size used by `layout` when no size is given
    #[serde(default = "default_layout")]
    pub default_layout: i64,

    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Card search endpoint
    #[serde(default = "default_lookup_url")]
    pub lookup_base_url: String,

    /// Pause before every lookup request, to respect the API rate limit
    #[serde(default = "default_lookup_delay")]
    pub lookup_delay_ms: u64,

    #[serde(default = "default_debounce")]
    pub search_debounce_ms: u64,

    #[serde(default = "default_page_size")]
    pub search_page_size: usize,

    /// Base URL for text placeholders; `?text=...` is appended
    #[serde(default = "default_placeholder_url")]
    pub placeholder_image_url: String,
}

fn default_layout() -> i64 {
    3
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

fn default_lookup_url() -> String {
    DEFAULT_LOOKUP_URL.to_string()
}

fn default_lookup_delay() -> u64 {
    500
}

fn default_debounce() -> u64 {
    500
}

fn default_page_size() -> usize {
    20
}

fn default_placeholder_url() -> String {
    DEFAULT_PLACEHOLDER_URL.to_string()
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            default_layout: default_layout(),
            max_history: default_max_history(),
            lookup_base_url: default_lookup_url(),
            lookup_delay_ms: default_lookup_delay(),
            search_debounce_ms: default_debounce(),
            search_page_size: default_page_size(),
            placeholder_image_url: default_placeholder_url(),
        }
    }
}

impl BinderConfig {
    pub const KEYS: [&'static str; 7] = [
        "default_layout",
        "max_history",
        "lookup_base_url",
        "lookup_delay_ms",
        "search_debounce_ms",
        "search_page_size",
        "placeholder_image_url",
    ];

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: BinderConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "default_layout" => self.default_layout.to_string(),
            "max_history" => self.max_history.to_string(),
            "lookup_base_url" => self.lookup_base_url.clone(),
            "lookup_delay_ms" => self.lookup_delay_ms.to_string(),
            "search_debounce_ms" => self.search_debounce_ms.to_string(),
            "search_page_size" => self.search_page_size.to_string(),
            "placeholder_image_url" => self.placeholder_image_url.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Sets one key from its string form. Unknown keys and unparsable or
    /// out-of-range values are rejected with a message.
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        let value = value.trim();
        match key {
            "default_layout" => {
                let n = parse_positive(key, value)?;
                self.default_layout = n as i64;
            }
            "max_history" => self.max_history = parse_positive(key, value)?,
            "lookup_base_url" => self.lookup_base_url = parse_url(key, value)?,
            "lookup_delay_ms" => self.lookup_delay_ms = parse_number(key, value)?,
            "search_debounce_ms" => self.search_debounce_ms = parse_number(key, value)?,
            "search_page_size" => self.search_page_size = parse_positive(key, value)?,
            "placeholder_image_url" => self.placeholder_image_url = parse_url(key, value)?,
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    /// Every key with its current value, in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        Self::KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> std::result::Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", key, value))
}

fn parse_positive(key: &str, value: &str) -> std::result::Result<usize, String> {
    match parse_number::<usize>(key, value)? {
        0 => Err(format!("{} must be greater than zero", key)),
        n => Ok(n),
    }
}

fn parse_url(key: &str, value: &str) -> std::result::Result<String, String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.trim_end_matches('/').to_string())
    } else {
        Err(format!("{} must be an http(s) URL", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = BinderConfig::default();
        assert_eq!(config.default_layout, 3);
        assert_eq!(config.max_history, 20);
        assert_eq!(config.lookup_delay_ms, 500);
        assert_eq!(config.search_page_size, 20);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempdir().unwrap();
        let config = BinderConfig::load(dir.path()).unwrap();
        assert_eq!(config, BinderConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");

        let mut config = BinderConfig::default();
        config.set("default_layout", "4").unwrap();
        config.save(&nested).unwrap();

        let loaded = BinderConfig::load(&nested).unwrap();
        assert_eq!(loaded.default_layout, 4);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"max_history": 5}"#).unwrap();
        let config = BinderConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_history, 5);
        assert_eq!(config.lookup_base_url, DEFAULT_LOOKUP_URL);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = BinderConfig::default();
        assert!(config.set("default_layout", "0").is_err());
        assert!(config.set("max_history", "many").is_err());
        assert!(config.set("lookup_base_url", "ftp://x").is_err());
        assert!(config.set("colour", "red").is_err());
        assert_eq!(config, BinderConfig::default());
    }

    #[test]
    fn test_get_every_key() {
        let config = BinderConfig::default();
        let entries = config.entries();
        assert_eq!(entries.len(), BinderConfig::KEYS.len());
        assert_eq!(config.get("lookup_delay_ms").as_deref(), Some("500"));
        assert_eq!(config.get("nope"), None);
    }
}
