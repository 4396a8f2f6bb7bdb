//! Contract of the online subsystem a coordinator drives.
//!
//! Commands return immediately. Each accepted command produces exactly one
//! [`BackendEvent`] later, delivered over the channel handed to the backend at
//! construction time. The coordinator never blocks on a backend.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::BackendError;
use crate::ids::{SearchId, SessionName, SubsystemName, UserIndex};
use crate::search::BackendSearchResult;
use crate::settings::{SearchQuery, SessionSettings};

/// Outcome of a join request as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinSessionResult {
    Success,
    SessionIsFull,
    SessionDoesNotExist,
    CouldNotRetrieveAddress,
    AlreadyInSession,
    UnknownError,
}

impl JoinSessionResult {
    pub const fn is_success(self) -> bool {
        matches!(self, JoinSessionResult::Success)
    }
}

/// Completion of a previously issued backend command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    CreateSessionComplete {
        name: SessionName,
        success: bool,
    },
    DestroySessionComplete {
        name: SessionName,
        success: bool,
    },
    FindSessionsComplete {
        search: SearchId,
        success: bool,
        results: Vec<BackendSearchResult>,
    },
    JoinSessionComplete {
        name: SessionName,
        result: JoinSessionResult,
    },
}

/// Sending half of the completion queue a backend writes into.
pub type BackendEventSender = mpsc::UnboundedSender<BackendEvent>;

/// Backend-side view of a session this process hosts or has joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSession {
    pub name: SessionName,
    pub settings: SessionSettings,
    pub hosting: bool,
    pub started: bool,
}

/// Online subsystem operations consumed by the coordinator.
pub trait SessionBackend: Send {
    /// Identity of the subsystem (`NULL` for the offline/LAN one).
    fn subsystem(&self) -> &SubsystemName;

    /// Completes with [`BackendEvent::CreateSessionComplete`].
    fn create_session(
        &mut self,
        user: UserIndex,
        name: &SessionName,
        settings: &SessionSettings,
    ) -> Result<(), BackendError>;

    /// Completes with [`BackendEvent::DestroySessionComplete`].
    fn destroy_session(&mut self, name: &SessionName) -> Result<(), BackendError>;

    /// Completes with [`BackendEvent::FindSessionsComplete`] carrying `search`.
    fn find_sessions(
        &mut self,
        user: UserIndex,
        search: SearchId,
        query: &SearchQuery,
    ) -> Result<(), BackendError>;

    /// Completes with [`BackendEvent::JoinSessionComplete`].
    fn join_session(
        &mut self,
        user: UserIndex,
        name: &SessionName,
        session: &BackendSearchResult,
    ) -> Result<(), BackendError>;

    /// Marks the session as in progress. Fire-and-forget.
    fn start_session(&mut self, name: &SessionName);

    /// Network address clients travel to for `name`.
    fn resolved_connect_string(&self, name: &SessionName) -> Option<String>;

    fn named_session(&self, name: &SessionName) -> Option<NamedSession>;
}
