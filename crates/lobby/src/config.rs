use std::path::Path;

use null_backend::NullBackendConfig;
use serde::{Deserialize, Serialize};
use session::{ConfigError, CoordinatorConfig};

/// Contents of the lobby's TOML file: a `[session]` and a `[backend]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    pub session: CoordinatorConfig,
    pub backend: NullBackendConfig,
}

impl LobbyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.session.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
