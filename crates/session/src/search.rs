//! Search results surfaced to the menu and the cache used for index-based joins.

use serde::{Deserialize, Serialize};

use crate::settings::SessionSettings;

/// Raw backend view of one discovered session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSearchResult {
    pub session_id: String,
    pub owning_user_name: String,
    pub settings: SessionSettings,
    pub open_public_connections: u32,
}

/// Menu-facing summary of a discovered session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub host_username: String,
    pub max_players: u32,
    pub current_players: u32,
    pub display_name: String,
}

impl SearchResult {
    /// Builds the summary; `placeholder` is used when the session carries no `name_key` attribute.
    pub fn from_backend(result: &BackendSearchResult, name_key: &str, placeholder: &str) -> Self {
        let max_players = result.settings.max_connections;
        Self {
            id: result.session_id.clone(),
            host_username: result.owning_user_name.clone(),
            max_players,
            current_players: max_players.saturating_sub(result.open_public_connections),
            display_name: result
                .settings
                .attribute(name_key)
                .unwrap_or(placeholder)
                .to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedSession {
    summary: SearchResult,
    backend: BackendSearchResult,
}

/// Snapshot of the last completed search, in backend order.
///
/// Replaced wholesale on every completed search; never merged.
#[derive(Debug, Clone, Default)]
pub struct SearchResultCache {
    entries: Vec<CachedSession>,
}

impl SearchResultCache {
    pub fn from_backend(
        results: Vec<BackendSearchResult>,
        name_key: &str,
        placeholder: &str,
    ) -> Self {
        let entries = results
            .into_iter()
            .map(|backend| CachedSession {
                summary: SearchResult::from_backend(&backend, name_key, placeholder),
                backend,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SearchResult> {
        self.entries.get(index).map(|entry| &entry.summary)
    }

    /// Backend handle needed to join the session at `index`.
    pub fn backend_result(&self, index: usize) -> Option<&BackendSearchResult> {
        self.entries.get(index).map(|entry| &entry.backend)
    }

    pub fn results(&self) -> Vec<SearchResult> {
        self.entries.iter().map(|entry| entry.summary.clone()).collect()
    }
}
