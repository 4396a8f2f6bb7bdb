//! Configuration of the session coordinator.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{SessionName, UserIndex};
use crate::settings::SERVER_NAME_KEY;

/// Errors raised while loading a [`CoordinatorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Name of the one session the coordinator hosts or joins.
    pub session_name: SessionName,
    pub server_name_key: String,
    pub user_index: UserIndex,
    pub max_connections: u32,
    pub max_search_results: u32,
    /// Map the host travels to after creating a session.
    pub lobby_map: String,
    pub main_menu_map: String,
    /// Shown in the server list when a session carries no server name.
    pub unnamed_server_label: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            session_name: SessionName::game_session(),
            server_name_key: SERVER_NAME_KEY.to_owned(),
            user_index: UserIndex::new(0),
            max_connections: 4,
            max_search_results: 100,
            lobby_map: "/Game/Maps/Lobby?listen".to_owned(),
            main_menu_map: "/Game/MenuSystem/Menu".to_owned(),
            unnamed_server_label: "Could not find name".to_owned(),
        }
    }
}

impl CoordinatorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_name.as_str().is_empty() {
            return Err(ConfigError::Invalid("session_name must not be empty"));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid("max_connections must be at least 1"));
        }
        if self.max_search_results == 0 {
            return Err(ConfigError::Invalid("max_search_results must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CoordinatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoordinatorConfig::default());
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.max_search_results, 100);
        assert_eq!(config.session_name.as_str(), "GameSession");
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = CoordinatorConfig::from_toml_str(
            r#"
            max_connections = 8
            lobby_map = "/Game/Maps/Arena?listen"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.lobby_map, "/Game/Maps/Arena?listen");
        assert_eq!(config.server_name_key, SERVER_NAME_KEY);
    }

    #[test]
    fn zero_connections_is_rejected() {
        let err = CoordinatorConfig::from_toml_str("max_connections = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = CoordinatorConfig::from_toml_str("max_connections = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
