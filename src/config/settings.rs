//! User configuration
//!
//! Loads the settex config from its TOML file, applies environment variable
//! overrides, and persists changes. The config carries the export identity
//! and the user's collection table.

use crate::error::{Result, SettexError};
use crate::interchange::ExportCollectionRow;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Name stamped into export manifests; may be empty
    #[serde(default)]
    pub username: String,

    /// Settings store location; defaults to store.json next to the config
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    #[serde(default)]
    pub no_color: bool,

    /// Export collection rows
    #[serde(default)]
    pub collections: Vec<ExportCollectionRow>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_config_path() -> Result<PathBuf> {
        // Use XDG Base Directory specification on Linux and macOS
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            use std::env;
            let config_dir = if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
                PathBuf::from(xdg_config_home)
            } else {
                let home_dir = env::var("HOME")
                    .map_err(|_| SettexError::config("HOME environment variable not set"))?;
                PathBuf::from(home_dir).join(".config")
            };
            Ok(config_dir.join("settex").join("settex.toml"))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            let config_dir = dirs::config_dir()
                .ok_or_else(|| SettexError::config("Unable to determine config directory"))?;
            Ok(config_dir.join("settex").join("settex.toml"))
        }
    }

    /// Store path from config, or store.json beside the config file
    pub fn resolve_store_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        let mut path = Self::get_config_path()?;
        path.set_file_name("store.json");
        Ok(path)
    }

    pub async fn load() -> Result<Self> {
        let mut config = Config::default();

        let config_path = Self::get_config_path()?;
        if config_path.exists() {
            config = load_from_file(&config_path).await?;
        }

        load_from_env(&mut config);

        Ok(config)
    }

    pub async fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| SettexError::serialization(e.to_string()))?;
        tokio::fs::write(&config_path, contents).await?;
        Ok(())
    }
}

async fn load_from_file(path: &PathBuf) -> Result<Config> {
    let contents = tokio::fs::read_to_string(path).await?;

    // Try to parse as TOML first, then JSON as fallback
    if let Ok(config) = toml::from_str::<Config>(&contents) {
        return Ok(config);
    }

    let config = serde_json::from_str::<Config>(&contents)?;
    Ok(config)
}

fn load_from_env(config: &mut Config) {
    if let Ok(value) = std::env::var("SETTEX_USERNAME") {
        config.username = value;
    }

    if let Ok(value) = std::env::var("SETTEX_STORE") {
        config.store_path = Some(PathBuf::from(value));
    }

    if let Ok(value) = std::env::var("NO_COLOR") {
        config.no_color = !value.is_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_with_collections() {
        let toml = r#"
            username = "alice"
            no_color = true

            [[collections]]
            collection = "nav"
            module_id = "keyboardNav"
            option_keys = "focusBorder,commentsNav"

            [[collections]]
            collection = "all"
            module_id = "accounts"
            option_keys = "apiToken"
            include_private = true
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.username, "alice");
        assert!(config.no_color);
        assert_eq!(config.collections.len(), 2);
        assert!(!config.collections[0].include_private);
        assert!(config.collections[1].include_private);
    }

    #[test]
    fn test_empty_config_parses() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.username.is_empty());
        assert!(config.collections.is_empty());
        assert!(config.store_path.is_none());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let mut config = Config::new();
        config.username = "bob".to_string();
        config.collections.push(ExportCollectionRow {
            collection: "nav".to_string(),
            module_id: "keyboardNav".to_string(),
            option_keys: "focusBorder".to_string(),
            include_private: false,
        });
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.username, "bob");
        assert_eq!(parsed.collections, config.collections);
    }
}
