//! "NULL" online subsystem: sessions are hosted and discovered on a simulated LAN.
//!
//! Every backend created from the same [`LanRegistry`] sees the sessions the
//! others advertise. Completions are written into the coordinator's event
//! queue, optionally after an artificial latency.

mod registry;

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use session::{
    BackendError, BackendEvent, BackendEventSender, BackendSearchResult, JoinSessionResult,
    NamedSession, SearchId, SearchQuery, SessionBackend, SessionName, SessionSettings,
    SubsystemName, UserIndex,
};
use tracing::{debug, warn};

pub use registry::LanRegistry;

pub(crate) const LOG_TARGET: &str = "session::null_backend";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullBackendConfig {
    /// Shown to other players as the session owner.
    pub user_name: String,
    /// Address clients travel to when joining a session hosted here.
    pub host_address: String,
    /// Delay before completions are delivered; 0 delivers on the next poll.
    pub latency_ms: u64,
}

impl Default for NullBackendConfig {
    fn default() -> Self {
        Self {
            user_name: "Player".to_owned(),
            host_address: "127.0.0.1:7777".to_owned(),
            latency_ms: 0,
        }
    }
}

#[derive(Debug, Clone)]
enum Role {
    /// `advertisement` is `None` for sessions created with `advertise = false`.
    Hosting { advertisement: Option<String> },
    Joined { session_id: String, host_address: String },
}

#[derive(Debug, Clone)]
struct LocalSession {
    settings: SessionSettings,
    role: Role,
    started: bool,
}

pub struct NullSessionBackend {
    owner: u64,
    subsystem: SubsystemName,
    registry: LanRegistry,
    config: NullBackendConfig,
    events: BackendEventSender,
    sessions: HashMap<SessionName, LocalSession>,
}

impl NullSessionBackend {
    pub fn new(registry: LanRegistry, config: NullBackendConfig, events: BackendEventSender) -> Self {
        let owner = registry.register_owner();
        debug!(
            target: LOG_TARGET,
            "null backend {owner} for {} at {}", config.user_name, config.host_address
        );
        Self {
            owner,
            subsystem: SubsystemName::null(),
            registry,
            config,
            events,
            sessions: HashMap::new(),
        }
    }

    pub fn config(&self) -> &NullBackendConfig {
        &self.config
    }

    /// Commands check this before touching local or registry state, so a
    /// rejected command leaves nothing behind.
    fn ensure_listening(&self) -> Result<(), BackendError> {
        if self.events.is_closed() {
            return Err(BackendError::ChannelClosed);
        }
        Ok(())
    }

    fn deliver(&self, event: BackendEvent) -> Result<(), BackendError> {
        self.ensure_listening()?;
        let latency = Duration::from_millis(self.config.latency_ms);
        if latency.is_zero() {
            return self
                .events
                .send(event)
                .map_err(|_| BackendError::ChannelClosed);
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let events = self.events.clone();
                handle.spawn(async move {
                    tokio::time::sleep(latency).await;
                    if events.send(event).is_err() {
                        debug!(target: LOG_TARGET, "completion dropped, coordinator gone");
                    }
                });
                Ok(())
            }
            Err(_) => {
                warn!(target: LOG_TARGET, "no tokio runtime, delivering without latency");
                self.events
                    .send(event)
                    .map_err(|_| BackendError::ChannelClosed)
            }
        }
    }
}

impl SessionBackend for NullSessionBackend {
    fn subsystem(&self) -> &SubsystemName {
        &self.subsystem
    }

    fn create_session(
        &mut self,
        _user: UserIndex,
        name: &SessionName,
        settings: &SessionSettings,
    ) -> Result<(), BackendError> {
        self.ensure_listening()?;
        let success = !self.sessions.contains_key(name);
        if success {
            let advertisement = settings.advertise.then(|| {
                self.registry.advertise(
                    self.owner,
                    &self.config.user_name,
                    &self.config.host_address,
                    settings,
                )
            });
            self.sessions.insert(
                name.clone(),
                LocalSession {
                    settings: settings.clone(),
                    role: Role::Hosting { advertisement },
                    started: false,
                },
            );
        } else {
            debug!(target: LOG_TARGET, "session {name} already exists");
        }
        self.deliver(BackendEvent::CreateSessionComplete {
            name: name.clone(),
            success,
        })
    }

    fn destroy_session(&mut self, name: &SessionName) -> Result<(), BackendError> {
        self.ensure_listening()?;
        let removed = self.sessions.remove(name);
        match removed.as_ref().map(|session| &session.role) {
            Some(Role::Hosting {
                advertisement: Some(session_id),
            }) => self.registry.withdraw(session_id),
            Some(Role::Joined { session_id, .. }) => self.registry.release(session_id),
            Some(Role::Hosting { advertisement: None }) | None => {}
        }
        self.deliver(BackendEvent::DestroySessionComplete {
            name: name.clone(),
            success: removed.is_some(),
        })
    }

    fn find_sessions(
        &mut self,
        _user: UserIndex,
        search: SearchId,
        query: &SearchQuery,
    ) -> Result<(), BackendError> {
        self.ensure_listening()?;
        let results = self.registry.search(self.owner, query);
        debug!(target: LOG_TARGET, "search {search} found {} sessions", results.len());
        self.deliver(BackendEvent::FindSessionsComplete {
            search,
            success: true,
            results,
        })
    }

    fn join_session(
        &mut self,
        _user: UserIndex,
        name: &SessionName,
        session: &BackendSearchResult,
    ) -> Result<(), BackendError> {
        self.ensure_listening()?;
        let result = if self.sessions.contains_key(name) {
            JoinSessionResult::AlreadyInSession
        } else {
            match self.registry.reserve(&session.session_id) {
                Ok(reservation) => {
                    self.sessions.insert(
                        name.clone(),
                        LocalSession {
                            settings: session.settings.clone(),
                            role: Role::Joined {
                                session_id: session.session_id.clone(),
                                host_address: reservation.host_address,
                            },
                            started: false,
                        },
                    );
                    JoinSessionResult::Success
                }
                Err(result) => result,
            }
        };
        self.deliver(BackendEvent::JoinSessionComplete {
            name: name.clone(),
            result,
        })
    }

    fn start_session(&mut self, name: &SessionName) {
        let Some(session) = self.sessions.get_mut(name) else {
            debug!(target: LOG_TARGET, "start of unknown session {name}");
            return;
        };
        session.started = true;
        if let Role::Hosting {
            advertisement: Some(session_id),
        } = &session.role
        {
            self.registry.mark_started(session_id);
        }
    }

    fn resolved_connect_string(&self, name: &SessionName) -> Option<String> {
        self.sessions.get(name).map(|session| match &session.role {
            Role::Hosting { .. } => self.config.host_address.clone(),
            Role::Joined { host_address, .. } => host_address.clone(),
        })
    }

    fn named_session(&self, name: &SessionName) -> Option<NamedSession> {
        self.sessions.get(name).map(|session| NamedSession {
            name: name.clone(),
            settings: session.settings.clone(),
            hosting: matches!(session.role, Role::Hosting { .. }),
            started: session.started,
        })
    }
}

impl Drop for NullSessionBackend {
    fn drop(&mut self) {
        for session in self.sessions.values() {
            match &session.role {
                Role::Hosting {
                    advertisement: Some(session_id),
                } => self.registry.withdraw(session_id),
                Role::Joined { session_id, .. } => self.registry.release(session_id),
                Role::Hosting { advertisement: None } => {}
            }
        }
    }
}
