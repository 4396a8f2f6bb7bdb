//! Simulated local network shared by all NULL backends of one process.

use std::sync::{Arc, Mutex, MutexGuard};

use session::{BackendSearchResult, IdGenerator, JoinSessionResult, SearchQuery, SessionSettings};
use tracing::debug;
use uuid::Uuid;

use crate::LOG_TARGET;

/// Session advertised on the simulated LAN.
#[derive(Debug, Clone)]
struct Advertisement {
    session_id: String,
    owner: u64,
    owning_user_name: String,
    host_address: String,
    settings: SessionSettings,
    open_public_connections: u32,
    started: bool,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Kept in advertisement order; searches report in this order.
    sessions: Vec<Advertisement>,
}

impl RegistryState {
    fn find_mut(&mut self, session_id: &str) -> Option<&mut Advertisement> {
        self.sessions
            .iter_mut()
            .find(|ad| ad.session_id == session_id)
    }
}

/// Slot granted to a joining client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reservation {
    pub host_address: String,
}

/// Cloneable handle to the shared LAN state.
#[derive(Debug, Clone, Default)]
pub struct LanRegistry {
    state: Arc<Mutex<RegistryState>>,
    owners: IdGenerator,
}

impl LanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently advertised.
    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn register_owner(&self) -> u64 {
        self.owners.next()
    }

    pub(crate) fn advertise(
        &self,
        owner: u64,
        owning_user_name: &str,
        host_address: &str,
        settings: &SessionSettings,
    ) -> String {
        let session_id = Uuid::new_v4().to_string();
        debug!(target: LOG_TARGET, "advertising {session_id} for {owning_user_name}");
        self.lock().sessions.push(Advertisement {
            session_id: session_id.clone(),
            owner,
            owning_user_name: owning_user_name.to_owned(),
            host_address: host_address.to_owned(),
            settings: settings.clone(),
            open_public_connections: settings.max_connections,
            started: false,
        });
        session_id
    }

    pub(crate) fn withdraw(&self, session_id: &str) {
        let mut state = self.lock();
        state.sessions.retain(|ad| ad.session_id != session_id);
        debug!(target: LOG_TARGET, "withdrew {session_id}");
    }

    pub(crate) fn mark_started(&self, session_id: &str) {
        if let Some(ad) = self.lock().find_mut(session_id) {
            ad.started = true;
        }
    }

    /// Sessions of other owners matching `query`, capped at `max_results`.
    pub(crate) fn search(&self, owner: u64, query: &SearchQuery) -> Vec<BackendSearchResult> {
        self.lock()
            .sessions
            .iter()
            .filter(|ad| ad.owner != owner && query.matches(&ad.settings))
            .take(query.max_results as usize)
            .map(|ad| BackendSearchResult {
                session_id: ad.session_id.clone(),
                owning_user_name: ad.owning_user_name.clone(),
                settings: ad.settings.clone(),
                open_public_connections: ad.open_public_connections,
            })
            .collect()
    }

    /// Takes one public slot of `session_id`.
    pub(crate) fn reserve(&self, session_id: &str) -> Result<Reservation, JoinSessionResult> {
        let mut state = self.lock();
        let ad = state
            .find_mut(session_id)
            .ok_or(JoinSessionResult::SessionDoesNotExist)?;
        if ad.open_public_connections == 0 {
            return Err(JoinSessionResult::SessionIsFull);
        }
        ad.open_public_connections -= 1;
        Ok(Reservation {
            host_address: ad.host_address.clone(),
        })
    }

    /// Gives back a slot taken by [`LanRegistry::reserve`].
    pub(crate) fn release(&self, session_id: &str) {
        if let Some(ad) = self.lock().find_mut(session_id) {
            ad.open_public_connections =
                (ad.open_public_connections + 1).min(ad.settings.max_connections);
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // A panic while holding the lock cannot leave the list half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
