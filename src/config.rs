use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/duo_chat.json";
pub const DATABASE_ENV: &str = "DUO_CHAT_DATABASE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file backing the document store; in-memory store when unset.
    pub database_path: Option<String>,
    /// Capacity of the UI -> service command channel.
    pub command_buffer: usize,
    pub window_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            command_buffer: 100,
            window_title: "Duo Chat".to_string(),
        }
    }
}

impl AppConfig {
    /// Applies `DUO_CHAT_DATABASE` and then the command-line override.
    pub fn with_overrides(self, cli_database: Option<String>) -> Self {
        self.apply_database_overrides(env::var(DATABASE_ENV).ok(), cli_database)
    }

    fn apply_database_overrides(
        mut self,
        env_database: Option<String>,
        cli_database: Option<String>,
    ) -> Self {
        if let Some(path) = env_database.filter(|path| !path.is_empty()) {
            self.database_path = Some(path);
        }
        if cli_database.is_some() {
            self.database_path = cli_database;
        }
        self
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No config at {}; using defaults", path.display());
            AppConfig::default()
        }
        Err(err) => {
            log::warn!("Failed to read config {}: {err}", path.display());
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert_eq!(load_config(path.to_str().unwrap()), AppConfig::default());
    }

    #[test]
    fn invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config(path.to_str().unwrap()), AppConfig::default());
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "database_path": "data/chat.db" }"#).unwrap();

        let config = load_config(path.to_str().unwrap());
        assert_eq!(config.database_path.as_deref(), Some("data/chat.db"));
        assert_eq!(config.command_buffer, 100);
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("duo_chat.json");
        let path = path.to_str().unwrap();
        let config = AppConfig {
            database_path: Some("x.db".to_string()),
            command_buffer: 4,
            window_title: "Test".to_string(),
        };

        save_config(path, &config).unwrap();
        assert_eq!(load_config(path), config);
    }

    #[test]
    fn env_database_replaces_file_setting() {
        let file_config = AppConfig {
            database_path: Some("file.db".to_string()),
            ..AppConfig::default()
        };

        let config = file_config
            .clone()
            .apply_database_overrides(Some("env.db".to_string()), None);
        assert_eq!(config.database_path.as_deref(), Some("env.db"));

        let config = file_config
            .clone()
            .apply_database_overrides(Some(String::new()), None);
        assert_eq!(config.database_path.as_deref(), Some("file.db"));

        let config = file_config.apply_database_overrides(
            Some("env.db".to_string()),
            Some("cli.db".to_string()),
        );
        assert_eq!(config.database_path.as_deref(), Some("cli.db"));
    }

    #[test]
    fn env_variable_is_read() {
        // no other test sets this variable
        unsafe { env::set_var(DATABASE_ENV, "from-env.db") };
        let config = AppConfig::default().with_overrides(None);
        unsafe { env::remove_var(DATABASE_ENV) };
        assert_eq!(config.database_path.as_deref(), Some("from-env.db"));
    }

    #[test]
    fn cli_database_wins() {
        let config = AppConfig::default().with_overrides(Some("cli.db".to_string()));
        assert_eq!(config.database_path.as_deref(), Some("cli.db"));
    }
}
