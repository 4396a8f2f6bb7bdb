//! Session lifecycle between the game menu and the online subsystem.
//!
//! This crate hosts everything the menu needs to host, find and join sessions:
//! - backend: contract of the online subsystem (commands + completion events)
//! - coordinator: the state machine sequencing create/destroy/recreate and find/join
//! - search: search results and the cache used for index-based joins
//! - notifier: effects produced by the coordinator and their dispatch to the menu
//! - driver: single-threaded event loop consuming menu commands and backend completions
//!
//! Keep this crate free of UI and transport code. Backends live in their own crates.

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod driver;
pub mod error;
pub mod ids;
pub mod notifier;
pub mod runtime;
pub mod search;
pub mod settings;

pub use backend::{BackendEvent, BackendEventSender, JoinSessionResult, NamedSession, SessionBackend};
pub use config::{ConfigError, CoordinatorConfig};
pub use coordinator::{ActiveSession, SessionCoordinator, SessionPhase};
pub use driver::{MenuCommand, SessionDriver};
pub use error::{BackendError, SessionError};
pub use ids::{IdGenerator, SearchId, SessionName, SubsystemName, UserIndex};
pub use notifier::{MenuEffect, MenuNotifier};
pub use search::{BackendSearchResult, SearchResult, SearchResultCache};
pub use settings::{SearchQuery, SessionSettings, SERVER_NAME_KEY};

/// Convenience prelude for downstream crates.
pub mod prelude {
    pub use crate::backend::{BackendEvent, BackendEventSender, JoinSessionResult, SessionBackend};
    pub use crate::coordinator::{SessionCoordinator, SessionPhase};
    pub use crate::driver::{MenuCommand, SessionDriver};
    pub use crate::ids::{SessionName, SubsystemName};
    pub use crate::notifier::{MenuEffect, MenuNotifier};
    pub use crate::CoordinatorConfig;
}
