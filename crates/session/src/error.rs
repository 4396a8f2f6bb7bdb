//! Error types for session operations.

use thiserror::Error;

use crate::backend::JoinSessionResult;
use crate::coordinator::SessionPhase;
use crate::ids::SessionName;

/// Synchronous rejection of a backend command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend is not ready")]
    NotReady,
    #[error("completion channel closed")]
    ChannelClosed,
    #[error("backend rejected request: {0}")]
    Rejected(String),
}

/// Failures reported by the session coordinator.
///
/// None of them is fatal: the coordinator stays usable after every one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("could not create session {name}")]
    SessionCreateFailed { name: SessionName },
    #[error("could not destroy session {name}")]
    SessionDestroyFailed { name: SessionName },
    #[error("session search failed")]
    SearchFailed,
    #[error("join index {index} out of range ({len} results)")]
    JoinIndexOutOfRange { index: usize, len: usize },
    #[error("could not get connect string for session {name}")]
    ResolveConnectFailed { name: SessionName },
    #[error("no active session")]
    NoActiveSession,
    #[error("another session operation is pending ({phase:?})")]
    OperationPending { phase: SessionPhase },
    #[error("joining session failed: {result:?}")]
    JoinFailed { result: JoinSessionResult },
    #[error(transparent)]
    Backend(#[from] BackendError),
}
