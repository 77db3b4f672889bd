use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::ChaparralError;

pub const CONFIG_FILE_NAME: &str = "chaparral.json";
pub const TOKEN_ENV_VAR: &str = "CHAPARRAL_TOKEN";
pub const DEFAULT_BASE_URL: &str = "https://api.us-west.chaparral.ai";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub token: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from `path`, or from the first of `./chaparral.json` and
    /// `~/.config/chaparral/chaparral.json` that exists. `CHAPARRAL_TOKEN`
    /// overrides the token in any file.
    pub fn resolve(path: Option<&Path>) -> Result<ClientSettings, ChaparralError> {
        let config = match path {
            Some(path) => Self::read(path)?,
            None => match Self::default_locations().into_iter().find(|p| p.exists()) {
                Some(found) => Self::read(&found)?,
                None => Config::default(),
            },
        };
        let env_token = std::env::var(TOKEN_ENV_VAR).ok();
        Self::resolve_config(config, env_token)
    }

    pub fn read(path: &Path) -> Result<Config, ChaparralError> {
        let content = fs::read_to_string(path)
            .map_err(|_| ChaparralError::ConfigRead(path.to_path_buf()))?;
        serde_json::from_str(&content).map_err(|err| ChaparralError::ConfigParse(err.to_string()))
    }

    pub fn resolve_config(
        config: Config,
        env_token: Option<String>,
    ) -> Result<ClientSettings, ChaparralError> {
        let token = env_token
            .filter(|token| !token.trim().is_empty())
            .or(config.token)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ChaparralError::MissingToken)?;

        Ok(ClientSettings {
            token,
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs: config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dirs) = BaseDirs::new() {
            locations.push(
                dirs.home_dir()
                    .join(".config")
                    .join("chaparral")
                    .join(CONFIG_FILE_NAME),
            );
        }
        locations
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = Config {
            token: Some("abc".to_string()),
            ..Config::default()
        };
        let settings = ConfigLoader::resolve_config(config, None).unwrap();
        assert_eq!(settings.token, "abc");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn environment_token_wins() {
        let config = Config {
            token: Some("from-file".to_string()),
            ..Config::default()
        };
        let settings =
            ConfigLoader::resolve_config(config, Some("from-env".to_string())).unwrap();
        assert_eq!(settings.token, "from-env");
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = ConfigLoader::resolve_config(Config::default(), Some("  ".to_string()))
            .unwrap_err();
        assert_matches!(err, ChaparralError::MissingToken);
    }
}
