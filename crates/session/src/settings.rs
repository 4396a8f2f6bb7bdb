//! Session settings submitted to the backend and the query used to find sessions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute key under which the host advertises the human readable server name.
pub const SERVER_NAME_KEY: &str = "ServerName";

/// Settings of one session instance. Immutable once handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub is_lan: bool,
    pub max_connections: u32,
    pub advertise: bool,
    pub uses_presence: bool,
    pub attributes: BTreeMap<String, String>,
}

impl SessionSettings {
    pub fn new(max_connections: u32) -> Self {
        Self {
            is_lan: false,
            max_connections,
            advertise: true,
            uses_presence: true,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_lan(mut self, is_lan: bool) -> Self {
        self.is_lan = is_lan;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(4)
    }
}

/// Parameters of a session search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub max_results: u32,
    /// Equality filter on [`SessionSettings::uses_presence`]; `None` matches everything.
    pub presence: Option<bool>,
}

impl SearchQuery {
    pub const fn presence(max_results: u32) -> Self {
        Self {
            max_results,
            presence: Some(true),
        }
    }

    pub fn matches(&self, settings: &SessionSettings) -> bool {
        self.presence
            .map_or(true, |presence| settings.uses_presence == presence)
    }
}
