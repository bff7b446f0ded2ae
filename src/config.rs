// src/config.rs
use crate::generator::{MAX_LENGTH, MIN_LENGTH};
use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    /// Ledger file used when no `--file` flag is given.
    pub ledger_file: Option<PathBuf>,
    /// Account used when neither `--account` nor the environment
    /// variable is set.
    pub account: Option<String>,
    /// Password length used when `generate` is called without one.
    pub default_password_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ledger_file: None,
            account: None,
            default_password_length: 16,
        }
    }
}

impl Config {
    /// Clamp-free sanity check; a config asking for an impossible
    /// default length falls back rather than failing every `generate`.
    pub fn effective_password_length(&self) -> usize {
        if (MIN_LENGTH..=MAX_LENGTH).contains(&self.default_password_length) {
            self.default_password_length
        } else {
            warn!(
                "Configured default_password_length {} is outside {}..={}, using {}",
                self.default_password_length,
                MIN_LENGTH,
                MAX_LENGTH,
                Config::default().default_password_length
            );
            Config::default().default_password_length
        }
    }
}

fn get_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "passledger", "passledger")
        .map(|proj_dirs| proj_dirs.config_dir().join("passledger.toml"))
}

fn save_default_config(config_path: &Path, config: &Config) -> Result<(), String> {
    info!("Saving default config to {:?}", config_path);
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)
                .map_err(|e| format!("Failed to create config directory {:?}: {}", parent_dir, e))?;
        }
    }

    let toml_string = toml::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize default config to TOML: {}", e))?;

    let mut file = fs::File::create(config_path)
        .map_err(|e| format!("Failed to create config file {:?}: {}", config_path, e))?;
    file.write_all(toml_string.as_bytes())
        .map_err(|e| format!("Failed to write config to {:?}: {}", config_path, e))?;

    info!("Saved default configuration to {:?}", config_path);
    Ok(())
}

/// Loads the configuration, falling back to defaults on any problem.
/// A missing file is created with the defaults on first run; a file
/// that fails to parse is left alone and only warned about.
pub fn load_config() -> Config {
    if let Some(config_path) = get_config_path() {
        if config_path.exists() {
            match fs::read_to_string(&config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(loaded_config) => {
                        info!("Configuration loaded from {:?}", config_path);
                        return loaded_config;
                    }
                    Err(e) => {
                        warn!(
                            "Failed to parse config file at {:?}: {}. Using defaults.",
                            config_path, e
                        );
                    }
                },
                Err(e) => {
                    warn!(
                        "Failed to read config file at {:?}: {}. Using defaults.",
                        config_path, e
                    );
                }
            }
        } else {
            info!(
                "Config file not found at {:?}. Creating default configuration.",
                config_path
            );
            let default_config = Config::default();
            if let Err(e) = save_default_config(&config_path, &default_config) {
                warn!("Failed to save default configuration: {}", e);
            }
            return default_config;
        }
    } else {
        warn!("Could not determine config directory. Using defaults.");
    }
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_password_length, 16);
        assert!(config.ledger_file.is_none());
        assert!(config.account.is_none());
    }

    #[test]
    fn test_effective_length_falls_back_when_out_of_range() {
        let config = Config {
            default_password_length: 99,
            ..Default::default()
        };
        assert_eq!(config.effective_password_length(), 16);
        let config = Config {
            default_password_length: 24,
            ..Default::default()
        };
        assert_eq!(config.effective_password_length(), 24);
    }

    #[test]
    fn test_save_and_reload_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("passledger.toml");

        let config = Config {
            ledger_file: Some(PathBuf::from("/tmp/vault.ledger")),
            account: Some("alice".to_string()),
            default_password_length: 20,
        };
        save_default_config(&config_path, &config).unwrap();
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        let loaded: Config = toml::from_str(&content).unwrap();
        assert_eq!(loaded.account.as_deref(), Some("alice"));
        assert_eq!(loaded.default_password_length, 20);
        assert_eq!(loaded.ledger_file, config.ledger_file);
    }

    #[test]
    fn test_invalid_toml_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("broken.toml");
        fs::write(&config_path, "not valid toml = = =").unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        let parsed: Result<Config, _> = toml::from_str(&content);
        assert!(parsed.is_err());
        // load_config would warn and hand back the defaults here
        assert_eq!(Config::default().default_password_length, 16);
    }

    #[test]
    fn test_partial_toml_missing_mandatory_field() {
        // default_password_length has no serde default, so a file
        // omitting it fails to parse and the defaults win
        let partial = r#"account = "alice""#;
        let parsed: Result<Config, _> = toml::from_str(partial);
        assert!(parsed.is_err());
    }
}
