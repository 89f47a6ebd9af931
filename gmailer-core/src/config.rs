use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Environment variable names read by the configuration loader.
pub const ENV_SENDER_EMAIL: &str = "GMAIL_SENDER_EMAIL";
pub const ENV_RECEIVER_EMAIL: &str = "GMAIL_RECEIVER_EMAIL";
pub const ENV_APP_PASSWORD: &str = "GMAIL_APP_PASSWORD";
pub const ENV_WEATHER_ADDRESS: &str = "WEATHER_ADDRESS";

/// Address used for the weather section when neither the environment nor the
/// config file provides one.
pub const DEFAULT_WEATHER_ADDRESS: &str = "화성시 동탄";

/// Optional values stored on disk by `gmailer configure`.
///
/// Example TOML:
/// sender_email = "me@gmail.com"
/// receiver_email = "you@gmail.com"
/// app_password = "..."
/// weather_address = "화성시 동탄"
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub sender_email: Option<String>,
    pub receiver_email: Option<String>,
    pub app_password: Option<String>,
    pub weather_address: Option<String>,
}

impl FileConfig {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: FileConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "gmailer", "gmailer-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Fully resolved settings for one send.
#[derive(Debug, Clone)]
pub struct Config {
    pub sender_email: String,
    pub receiver_email: String,
    pub app_password: String,
    pub weather_address: String,
}

impl Config {
    /// Load the config file (if any) and merge it with the process
    /// environment. Fails when a required credential is missing from both.
    pub fn load() -> Result<Self> {
        let file = FileConfig::load()?;
        Self::resolve(&file, |name| std::env::var(name).ok())
    }

    /// Merge file-sourced values with an environment lookup.
    ///
    /// Explicit environment variables always override file-sourced values;
    /// empty values count as unset.
    pub fn resolve(file: &FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let sender_email = pick(env(ENV_SENDER_EMAIL), file.sender_email.clone());
        let receiver_email = pick(env(ENV_RECEIVER_EMAIL), file.receiver_email.clone());
        let app_password = pick(env(ENV_APP_PASSWORD), file.app_password.clone());
        let weather_address = pick(env(ENV_WEATHER_ADDRESS), file.weather_address.clone())
            .unwrap_or_else(|| DEFAULT_WEATHER_ADDRESS.to_string());

        let mut missing = Vec::new();
        if sender_email.is_none() {
            missing.push(ENV_SENDER_EMAIL);
        }
        if receiver_email.is_none() {
            missing.push(ENV_RECEIVER_EMAIL);
        }
        if app_password.is_none() {
            missing.push(ENV_APP_PASSWORD);
        }

        if !missing.is_empty() {
            return Err(anyhow!(
                "다음 환경 변수들을 설정해주세요: {}\n\
                 Hint: run `gmailer configure` to store them in the config file instead.",
                missing.join(", ")
            ));
        }

        Ok(Self {
            sender_email: sender_email.unwrap_or_default(),
            receiver_email: receiver_email.unwrap_or_default(),
            app_password: app_password.unwrap_or_default(),
            weather_address,
        })
    }

    /// Resolve only the weather address, never failing on missing
    /// credentials. Used by commands that render without sending.
    pub fn weather_address_or_default() -> String {
        let file = match FileConfig::load() {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable config file");
                FileConfig::default()
            }
        };

        pick(std::env::var(ENV_WEATHER_ADDRESS).ok(), file.weather_address)
            .unwrap_or_else(|| DEFAULT_WEATHER_ADDRESS.to_string())
    }
}

fn pick(env_value: Option<String>, file_value: Option<String>) -> Option<String> {
    env_value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| file_value.filter(|v| !v.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn lookup(map: &HashMap<String, String>) -> impl Fn(&str) -> Option<String> + '_ {
        move |name| map.get(name).cloned()
    }

    fn full_file() -> FileConfig {
        FileConfig {
            sender_email: Some("file-sender@gmail.com".to_string()),
            receiver_email: Some("file-receiver@gmail.com".to_string()),
            app_password: Some("file-password".to_string()),
            weather_address: Some("서울".to_string()),
        }
    }

    #[test]
    fn environment_overrides_file_values() {
        let env = env_of(&[
            (ENV_SENDER_EMAIL, "env-sender@gmail.com"),
            (ENV_WEATHER_ADDRESS, "부산"),
        ]);

        let cfg = Config::resolve(&full_file(), lookup(&env)).expect("config must resolve");

        assert_eq!(cfg.sender_email, "env-sender@gmail.com");
        assert_eq!(cfg.receiver_email, "file-receiver@gmail.com");
        assert_eq!(cfg.app_password, "file-password");
        assert_eq!(cfg.weather_address, "부산");
    }

    #[test]
    fn missing_credentials_are_listed_by_variable_name() {
        let env = env_of(&[(ENV_SENDER_EMAIL, "env-sender@gmail.com")]);
        let err = Config::resolve(&FileConfig::default(), lookup(&env)).unwrap_err();

        let msg = err.to_string();
        assert!(!msg.contains(ENV_SENDER_EMAIL));
        assert!(msg.contains(ENV_RECEIVER_EMAIL));
        assert!(msg.contains(ENV_APP_PASSWORD));
    }

    #[test]
    fn weather_address_defaults_when_unset() {
        let env = env_of(&[
            (ENV_SENDER_EMAIL, "a@gmail.com"),
            (ENV_RECEIVER_EMAIL, "b@gmail.com"),
            (ENV_APP_PASSWORD, "pw"),
        ]);

        let cfg = Config::resolve(&FileConfig::default(), lookup(&env)).expect("config must resolve");
        assert_eq!(cfg.weather_address, DEFAULT_WEATHER_ADDRESS);
    }

    #[test]
    fn empty_environment_values_fall_back_to_file() {
        let env = env_of(&[(ENV_SENDER_EMAIL, "   ")]);
        let cfg = Config::resolve(&full_file(), lookup(&env)).expect("config must resolve");
        assert_eq!(cfg.sender_email, "file-sender@gmail.com");
    }
}
