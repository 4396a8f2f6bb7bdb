//! Session lifecycle coordinator.
//!
//! Owns the desired server name, the single active session and the last
//! search snapshot. Every operation is a transition: it may issue backend
//! commands and returns the [`MenuEffect`]s the menu layer should apply.
//! Completions arrive later through the `on_*_complete` methods.
//!
//! Phases of the one session per process:
//!
//! ```text
//! Absent -> CreatePending -> Active -> DestroyPending -> Absent -> CreatePending (recreate)
//! Absent -> JoinPending -> Active
//! ```

use std::fmt;

use tracing::{debug, info, warn};

use crate::backend::{JoinSessionResult, SessionBackend};
use crate::config::CoordinatorConfig;
use crate::error::SessionError;
use crate::ids::{IdGenerator, SearchId, SessionName};
use crate::notifier::MenuEffect;
use crate::search::{BackendSearchResult, SearchResultCache};
use crate::settings::{SearchQuery, SessionSettings};

const LOG_TARGET: &str = "session::coordinator";

/// Lifecycle phase of the coordinator's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Absent,
    CreatePending,
    Active,
    DestroyPending,
    JoinPending,
}

impl SessionPhase {
    /// True while a create, destroy or join completion is outstanding.
    pub const fn is_pending(self) -> bool {
        matches!(
            self,
            SessionPhase::CreatePending | SessionPhase::DestroyPending | SessionPhase::JoinPending
        )
    }
}

/// The one session this process hosts or has joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub name: SessionName,
    pub settings: SessionSettings,
    pub hosting: bool,
    pub started: bool,
}

#[derive(Debug, Clone)]
enum SessionState {
    Absent,
    CreatePending(SessionSettings),
    Active(ActiveSession),
    DestroyPending(Option<ActiveSession>),
    JoinPending(SessionSettings),
}

impl SessionState {
    fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Absent => SessionPhase::Absent,
            SessionState::CreatePending(_) => SessionPhase::CreatePending,
            SessionState::Active(_) => SessionPhase::Active,
            SessionState::DestroyPending(_) => SessionPhase::DestroyPending,
            SessionState::JoinPending(_) => SessionPhase::JoinPending,
        }
    }
}

pub struct SessionCoordinator {
    config: CoordinatorConfig,
    backend: Option<Box<dyn SessionBackend>>,
    desired_server_name: String,
    state: SessionState,
    pending_search: Option<SearchId>,
    cache: Option<SearchResultCache>,
    search_ids: IdGenerator,
}

impl SessionCoordinator {
    pub fn new(config: CoordinatorConfig, backend: Option<Box<dyn SessionBackend>>) -> Self {
        match &backend {
            Some(backend) => info!(
                target: LOG_TARGET,
                "Found subsystem: {}",
                backend.subsystem()
            ),
            None => warn!(target: LOG_TARGET, "No subsystem found"),
        }
        Self {
            config,
            backend,
            desired_server_name: String::new(),
            state: SessionState::Absent,
            pending_search: None,
            cache: None,
            search_ids: IdGenerator::default(),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn active_session(&self) -> Option<&ActiveSession> {
        match &self.state {
            SessionState::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn desired_server_name(&self) -> &str {
        &self.desired_server_name
    }

    /// Snapshot of the last completed search, if any.
    pub fn search_results(&self) -> Option<&SearchResultCache> {
        self.cache.as_ref()
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Hosts a session named `server_name`, destroying a stale one first.
    ///
    /// The name is not validated; the backend decides what it accepts.
    /// A refused request leaves the desired server name untouched.
    pub fn request_host(&mut self, server_name: impl Into<String>) -> Vec<MenuEffect> {
        let result = self.try_request_host(server_name.into());
        report(result)
    }

    fn try_request_host(&mut self, server_name: String) -> Result<Vec<MenuEffect>, SessionError> {
        let Some(backend) = self.backend.as_mut() else {
            warn!(target: LOG_TARGET, "host requested without session backend");
            return Ok(Vec::new());
        };
        let phase = self.state.phase();
        if phase.is_pending() {
            return Err(SessionError::OperationPending { phase });
        }
        self.desired_server_name = server_name;

        let name = self.config.session_name.clone();
        if backend.named_session(&name).is_none() {
            return self.try_create_session();
        }

        debug!(target: LOG_TARGET, "destroying existing session {name} before hosting");
        let previous = match std::mem::replace(&mut self.state, SessionState::Absent) {
            SessionState::Active(session) => Some(session),
            _ => None,
        };
        if let Err(err) = backend.destroy_session(&name) {
            warn!(target: LOG_TARGET, "destroy of {name} rejected: {err}");
            self.resync_with_backend(previous);
            return Err(SessionError::SessionDestroyFailed { name });
        }
        self.state = SessionState::DestroyPending(previous);
        Ok(Vec::new())
    }

    /// Submits a new session built from the desired server name.
    ///
    /// Refused with [`SessionError::OperationPending`] while another create,
    /// destroy or join is outstanding.
    pub fn create_session(&mut self) -> Vec<MenuEffect> {
        let result = self.try_create_session();
        report(result)
    }

    fn try_create_session(&mut self) -> Result<Vec<MenuEffect>, SessionError> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(Vec::new());
        };
        let phase = self.state.phase();
        if phase.is_pending() {
            return Err(SessionError::OperationPending { phase });
        }

        let settings = SessionSettings::new(self.config.max_connections)
            .with_lan(backend.subsystem().is_null())
            .with_attribute(
                self.config.server_name_key.clone(),
                self.desired_server_name.clone(),
            );
        let name = self.config.session_name.clone();

        debug!(
            target: LOG_TARGET,
            "creating session {name} (lan: {}, server name: {:?})",
            settings.is_lan,
            self.desired_server_name
        );
        if let Err(err) = backend.create_session(self.config.user_index, &name, &settings) {
            warn!(target: LOG_TARGET, "create of {name} rejected: {err}");
            self.state = SessionState::Absent;
            return Err(SessionError::SessionCreateFailed { name });
        }
        self.state = SessionState::CreatePending(settings);
        Ok(Vec::new())
    }

    pub fn on_create_session_complete(
        &mut self,
        name: &SessionName,
        success: bool,
    ) -> Vec<MenuEffect> {
        if !self.is_own_session(name) {
            return Vec::new();
        }
        let settings = match std::mem::replace(&mut self.state, SessionState::Absent) {
            SessionState::CreatePending(settings) => settings,
            other => {
                warn!(target: LOG_TARGET, "unexpected create completion for {name}");
                self.state = other;
                return Vec::new();
            }
        };

        if !success {
            return report(Err(SessionError::SessionCreateFailed { name: name.clone() }));
        }

        info!(target: LOG_TARGET, "hosting session {name}");
        self.state = SessionState::Active(ActiveSession {
            name: name.clone(),
            settings,
            hosting: true,
            started: false,
        });
        vec![
            MenuEffect::Teardown,
            MenuEffect::Status("Hosting".to_owned()),
            MenuEffect::HostingSucceeded {
                lobby_url: self.config.lobby_map.clone(),
            },
        ]
    }

    pub fn on_destroy_session_complete(
        &mut self,
        name: &SessionName,
        success: bool,
    ) -> Vec<MenuEffect> {
        if !self.is_own_session(name) {
            return Vec::new();
        }
        let previous = match std::mem::replace(&mut self.state, SessionState::Absent) {
            SessionState::DestroyPending(previous) => previous,
            other => {
                warn!(target: LOG_TARGET, "unexpected destroy completion for {name}");
                self.state = other;
                return Vec::new();
            }
        };

        if success {
            debug!(target: LOG_TARGET, "session {name} destroyed, recreating");
            return self.create_session();
        }

        self.resync_with_backend(previous);
        report(Err(SessionError::SessionDestroyFailed { name: name.clone() }))
    }

    /// Starts a fresh search, discarding any search still in flight.
    pub fn refresh_server_list(&mut self) -> Vec<MenuEffect> {
        let Some(backend) = self.backend.as_mut() else {
            warn!(target: LOG_TARGET, "refresh requested without session backend");
            return Vec::new();
        };

        let search = SearchId::next(&self.search_ids);
        let query = SearchQuery::presence(self.config.max_search_results);
        match backend.find_sessions(self.config.user_index, search, &query) {
            Ok(()) => {
                debug!(target: LOG_TARGET, "searching for sessions ({search})");
                self.pending_search = Some(search);
            }
            Err(err) => {
                warn!(target: LOG_TARGET, "{}: {err}", SessionError::SearchFailed);
                self.pending_search = None;
            }
        }
        Vec::new()
    }

    pub fn on_find_sessions_complete(
        &mut self,
        search: SearchId,
        success: bool,
        results: Vec<BackendSearchResult>,
    ) -> Vec<MenuEffect> {
        if self.pending_search != Some(search) {
            debug!(target: LOG_TARGET, "ignoring completion of stale search {search}");
            return Vec::new();
        }
        self.pending_search = None;
        if !success {
            warn!(target: LOG_TARGET, "{}", SessionError::SearchFailed);
            return Vec::new();
        }

        for result in &results {
            debug!(target: LOG_TARGET, "found session {}", result.session_id);
        }
        let cache = SearchResultCache::from_backend(
            results,
            &self.config.server_name_key,
            &self.config.unnamed_server_label,
        );
        info!(target: LOG_TARGET, "finished searching, {} sessions", cache.len());
        let list = cache.results();
        self.cache = Some(cache);
        vec![MenuEffect::ServerListUpdated(list)]
    }

    /// Joins the session at `index` of the last completed search.
    pub fn join_by_index(&mut self, index: usize) -> Vec<MenuEffect> {
        let result = self.try_join_by_index(index);
        report(result)
    }

    fn try_join_by_index(&mut self, index: usize) -> Result<Vec<MenuEffect>, SessionError> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(Vec::new());
        };
        let Some(cache) = self.cache.as_ref() else {
            debug!(target: LOG_TARGET, "join requested before any completed search");
            return Ok(Vec::new());
        };
        let Some(session) = cache.backend_result(index) else {
            return Err(SessionError::JoinIndexOutOfRange {
                index,
                len: cache.len(),
            });
        };
        let phase = self.state.phase();
        if phase.is_pending() {
            return Err(SessionError::OperationPending { phase });
        }

        let name = self.config.session_name.clone();
        debug!(target: LOG_TARGET, "joining {} as {name}", session.session_id);
        backend.join_session(self.config.user_index, &name, session)?;
        self.state = SessionState::JoinPending(session.settings.clone());
        Ok(vec![MenuEffect::Teardown])
    }

    pub fn on_join_session_complete(
        &mut self,
        name: &SessionName,
        result: JoinSessionResult,
    ) -> Vec<MenuEffect> {
        if self.backend.is_none() || !self.is_own_session(name) {
            return Vec::new();
        }
        let settings = match std::mem::replace(&mut self.state, SessionState::Absent) {
            SessionState::JoinPending(settings) => settings,
            other => {
                warn!(target: LOG_TARGET, "unexpected join completion for {name}");
                self.state = other;
                return Vec::new();
            }
        };

        if !result.is_success() {
            self.resync_with_backend(None);
            return report(Err(SessionError::JoinFailed { result }));
        }

        let address = self
            .backend
            .as_ref()
            .and_then(|backend| backend.resolved_connect_string(name));
        let Some(address) = address else {
            self.resync_with_backend(None);
            return report(Err(SessionError::ResolveConnectFailed { name: name.clone() }));
        };

        info!(target: LOG_TARGET, "joining {address}");
        self.state = SessionState::Active(ActiveSession {
            name: name.clone(),
            settings,
            hosting: false,
            started: false,
        });
        vec![
            MenuEffect::Status(format!("Joining: {address}")),
            MenuEffect::JoinResolved { address },
        ]
    }

    /// Marks the active session as started once gameplay begins.
    pub fn start_session(&mut self) -> Vec<MenuEffect> {
        let SessionState::Active(session) = &mut self.state else {
            return report(Err(SessionError::NoActiveSession));
        };
        let Some(backend) = self.backend.as_mut() else {
            return Vec::new();
        };
        backend.start_session(&session.name);
        session.started = true;
        Vec::new()
    }

    /// Sends the player back to the main menu map. The session is left untouched.
    pub fn load_main_menu(&mut self) -> Vec<MenuEffect> {
        vec![MenuEffect::MainMenuRequested {
            url: self.config.main_menu_map.clone(),
        }]
    }

    fn is_own_session(&self, name: &SessionName) -> bool {
        if *name == self.config.session_name {
            return true;
        }
        debug!(target: LOG_TARGET, "ignoring completion for foreign session {name}");
        false
    }

    /// Re-reads the backend after an ambiguous failure.
    ///
    /// If the backend still tracks the session it is treated as active again,
    /// otherwise it is gone.
    fn resync_with_backend(&mut self, previous: Option<ActiveSession>) {
        let name = &self.config.session_name;
        let named = self
            .backend
            .as_ref()
            .and_then(|backend| backend.named_session(name));
        self.state = match named {
            Some(named) => {
                let session = previous.unwrap_or_else(|| ActiveSession {
                    name: named.name.clone(),
                    settings: named.settings.clone(),
                    hosting: named.hosting,
                    started: named.started,
                });
                debug!(target: LOG_TARGET, "backend still tracks {name}, keeping it active");
                SessionState::Active(session)
            }
            None => SessionState::Absent,
        };
    }
}

impl fmt::Debug for SessionCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("subsystem", &self.backend.as_ref().map(|b| b.subsystem().clone()))
            .field("desired_server_name", &self.desired_server_name)
            .field("state", &self.state)
            .field("pending_search", &self.pending_search)
            .field("cached_results", &self.cache.as_ref().map(SearchResultCache::len))
            .finish()
    }
}

fn report(result: Result<Vec<MenuEffect>, SessionError>) -> Vec<MenuEffect> {
    match result {
        Ok(effects) => effects,
        Err(err) => {
            warn!(target: LOG_TARGET, "{err}");
            vec![MenuEffect::Failed(err)]
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::backend::NamedSession;
    use crate::error::BackendError;
    use crate::ids::{SubsystemName, UserIndex};
    use crate::settings::SERVER_NAME_KEY;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(SessionName, SessionSettings),
        Destroy(SessionName),
        Find(SearchId, SearchQuery),
        Join(SessionName, String),
        Start(SessionName),
    }

    #[derive(Default)]
    struct Shared {
        calls: Vec<Call>,
        named: Option<NamedSession>,
        connect_string: Option<String>,
        reject: bool,
    }

    /// Records every command; completions are fed in by hand.
    struct RecordingBackend {
        subsystem: SubsystemName,
        shared: Arc<Mutex<Shared>>,
    }

    impl RecordingBackend {
        fn new(subsystem: &str) -> (Self, Arc<Mutex<Shared>>) {
            let shared = Arc::new(Mutex::new(Shared::default()));
            (
                Self {
                    subsystem: SubsystemName::new(subsystem),
                    shared: shared.clone(),
                },
                shared,
            )
        }

        fn record(&self, call: Call) -> Result<(), BackendError> {
            let mut shared = self.shared.lock().unwrap();
            if shared.reject {
                return Err(BackendError::Rejected("test".into()));
            }
            shared.calls.push(call);
            Ok(())
        }
    }

    impl SessionBackend for RecordingBackend {
        fn subsystem(&self) -> &SubsystemName {
            &self.subsystem
        }

        fn create_session(
            &mut self,
            _user: UserIndex,
            name: &SessionName,
            settings: &SessionSettings,
        ) -> Result<(), BackendError> {
            self.record(Call::Create(name.clone(), settings.clone()))
        }

        fn destroy_session(&mut self, name: &SessionName) -> Result<(), BackendError> {
            self.record(Call::Destroy(name.clone()))
        }

        fn find_sessions(
            &mut self,
            _user: UserIndex,
            search: SearchId,
            query: &SearchQuery,
        ) -> Result<(), BackendError> {
            self.record(Call::Find(search, *query))
        }

        fn join_session(
            &mut self,
            _user: UserIndex,
            name: &SessionName,
            session: &BackendSearchResult,
        ) -> Result<(), BackendError> {
            self.record(Call::Join(name.clone(), session.session_id.clone()))
        }

        fn start_session(&mut self, name: &SessionName) {
            self.shared.lock().unwrap().calls.push(Call::Start(name.clone()));
        }

        fn resolved_connect_string(&self, _name: &SessionName) -> Option<String> {
            self.shared.lock().unwrap().connect_string.clone()
        }

        fn named_session(&self, _name: &SessionName) -> Option<NamedSession> {
            self.shared.lock().unwrap().named.clone()
        }
    }

    fn coordinator(subsystem: &str) -> (SessionCoordinator, Arc<Mutex<Shared>>) {
        let (backend, shared) = RecordingBackend::new(subsystem);
        (
            SessionCoordinator::new(CoordinatorConfig::default(), Some(Box::new(backend))),
            shared,
        )
    }

    fn game() -> SessionName {
        SessionName::game_session()
    }

    fn calls(shared: &Arc<Mutex<Shared>>) -> Vec<Call> {
        shared.lock().unwrap().calls.clone()
    }

    fn creates(shared: &Arc<Mutex<Shared>>) -> Vec<SessionSettings> {
        calls(shared)
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(_, settings) => Some(settings),
                _ => None,
            })
            .collect()
    }

    fn mark_backend_session(shared: &Arc<Mutex<Shared>>) {
        shared.lock().unwrap().named = Some(NamedSession {
            name: game(),
            settings: SessionSettings::default(),
            hosting: true,
            started: false,
        });
    }

    fn found(id: &str, name: Option<&str>, max: u32, open: u32) -> BackendSearchResult {
        let mut settings = SessionSettings::new(max);
        if let Some(name) = name {
            settings = settings.with_attribute(SERVER_NAME_KEY, name);
        }
        BackendSearchResult {
            session_id: id.into(),
            owning_user_name: "host".into(),
            settings,
            open_public_connections: open,
        }
    }

    fn pending_search(shared: &Arc<Mutex<Shared>>) -> SearchId {
        calls(shared)
            .into_iter()
            .rev()
            .find_map(|call| match call {
                Call::Find(search, _) => Some(search),
                _ => None,
            })
            .expect("no search issued")
    }

    fn with_results(results: Vec<BackendSearchResult>) -> (SessionCoordinator, Arc<Mutex<Shared>>) {
        let (mut coordinator, shared) = coordinator("NULL");
        coordinator.refresh_server_list();
        let search = pending_search(&shared);
        coordinator.on_find_sessions_complete(search, true, results);
        (coordinator, shared)
    }

    #[test]
    fn host_without_session_creates_once_with_server_name() {
        for name in ["Arena", "", "Große Halle"] {
            let (mut coordinator, shared) = coordinator("NULL");
            let effects = coordinator.request_host(name);
            assert!(effects.is_empty());

            let created = creates(&shared);
            assert_eq!(created.len(), 1);
            assert_eq!(created[0].attribute(SERVER_NAME_KEY), Some(name));
            assert_eq!(created[0].max_connections, 4);
            assert!(created[0].advertise);
            assert!(created[0].uses_presence);
            assert_eq!(coordinator.phase(), SessionPhase::CreatePending);
        }
    }

    #[test]
    fn lan_flag_follows_subsystem_identity() {
        let (mut null, null_shared) = coordinator("NULL");
        null.request_host("a");
        assert!(creates(&null_shared)[0].is_lan);

        let (mut steam, steam_shared) = coordinator("STEAM");
        steam.request_host("a");
        assert!(!creates(&steam_shared)[0].is_lan);
    }

    #[test]
    fn host_with_existing_session_destroys_then_recreates_on_success() {
        let (mut coordinator, shared) = coordinator("NULL");
        mark_backend_session(&shared);

        coordinator.request_host("Arena");
        assert_eq!(calls(&shared), vec![Call::Destroy(game())]);
        assert_eq!(coordinator.phase(), SessionPhase::DestroyPending);

        shared.lock().unwrap().named = None;
        let effects = coordinator.on_destroy_session_complete(&game(), true);
        assert!(effects.is_empty());
        let created = creates(&shared);
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].attribute(SERVER_NAME_KEY), Some("Arena"));
        assert_eq!(coordinator.phase(), SessionPhase::CreatePending);
    }

    #[test]
    fn failed_destroy_does_not_recreate_and_resyncs() {
        let (mut coordinator, shared) = coordinator("NULL");
        mark_backend_session(&shared);

        coordinator.request_host("Arena");
        let effects = coordinator.on_destroy_session_complete(&game(), false);

        assert_eq!(
            effects,
            vec![MenuEffect::Failed(SessionError::SessionDestroyFailed { name: game() })]
        );
        assert!(creates(&shared).is_empty());
        // backend still reports the session
        assert_eq!(coordinator.phase(), SessionPhase::Active);

        shared.lock().unwrap().named = None;
        coordinator.request_host("Arena");
        assert_eq!(creates(&shared).len(), 1);
    }

    #[test]
    fn create_success_tears_down_and_travels_to_lobby() {
        let (mut coordinator, _shared) = coordinator("NULL");
        coordinator.request_host("Arena");

        let effects = coordinator.on_create_session_complete(&game(), true);
        assert_eq!(
            effects,
            vec![
                MenuEffect::Teardown,
                MenuEffect::Status("Hosting".into()),
                MenuEffect::HostingSucceeded {
                    lobby_url: "/Game/Maps/Lobby?listen".into()
                },
            ]
        );
        let active = coordinator.active_session().unwrap();
        assert!(active.hosting);
        assert_eq!(active.settings.attribute(SERVER_NAME_KEY), Some("Arena"));
    }

    #[test]
    fn create_failure_is_reported_and_coordinator_stays_usable() {
        let (mut coordinator, shared) = coordinator("NULL");
        coordinator.request_host("Arena");

        let effects = coordinator.on_create_session_complete(&game(), false);
        assert_eq!(
            effects,
            vec![MenuEffect::Failed(SessionError::SessionCreateFailed { name: game() })]
        );
        assert_eq!(coordinator.phase(), SessionPhase::Absent);

        coordinator.request_host("Arena");
        assert_eq!(creates(&shared).len(), 2);
    }

    #[test]
    fn rejected_create_is_reported() {
        let (mut coordinator, shared) = coordinator("NULL");
        shared.lock().unwrap().reject = true;

        let effects = coordinator.request_host("Arena");
        assert_eq!(
            effects,
            vec![MenuEffect::Failed(SessionError::SessionCreateFailed { name: game() })]
        );
        assert_eq!(coordinator.phase(), SessionPhase::Absent);
    }

    #[test]
    fn host_while_create_pending_is_refused() {
        let (mut coordinator, shared) = coordinator("NULL");
        coordinator.request_host("Arena");
        let effects = coordinator.request_host("Arena");

        assert_eq!(
            effects,
            vec![MenuEffect::Failed(SessionError::OperationPending {
                phase: SessionPhase::CreatePending
            })]
        );
        assert_eq!(creates(&shared).len(), 1);
    }

    #[test]
    fn host_start_then_rehost_creates_twice() {
        let (mut coordinator, shared) = coordinator("NULL");
        coordinator.request_host("Arena");
        coordinator.on_create_session_complete(&game(), true);
        mark_backend_session(&shared);

        assert!(coordinator.start_session().is_empty());
        assert_eq!(coordinator.phase(), SessionPhase::Active);
        assert!(coordinator.active_session().unwrap().started);
        assert!(calls(&shared).contains(&Call::Start(game())));

        coordinator.request_host("Arena");
        assert_eq!(coordinator.phase(), SessionPhase::DestroyPending);
        shared.lock().unwrap().named = None;
        coordinator.on_destroy_session_complete(&game(), true);
        coordinator.on_create_session_complete(&game(), true);

        assert_eq!(creates(&shared).len(), 2);
        assert_eq!(coordinator.phase(), SessionPhase::Active);
        assert!(!coordinator.active_session().unwrap().started);
    }

    #[test]
    fn refused_host_keeps_pending_server_name() {
        let (mut coordinator, shared) = coordinator("NULL");
        mark_backend_session(&shared);
        coordinator.request_host("A");

        let effects = coordinator.request_host("B");
        assert_eq!(
            effects,
            vec![MenuEffect::Failed(SessionError::OperationPending {
                phase: SessionPhase::DestroyPending
            })]
        );
        assert_eq!(coordinator.desired_server_name(), "A");

        shared.lock().unwrap().named = None;
        coordinator.on_destroy_session_complete(&game(), true);
        let created = creates(&shared);
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].attribute(SERVER_NAME_KEY), Some("A"));
    }

    #[test]
    fn create_while_pending_is_refused() {
        let (mut coordinator, shared) = coordinator("NULL");
        coordinator.request_host("A");
        assert_eq!(
            coordinator.create_session(),
            vec![MenuEffect::Failed(SessionError::OperationPending {
                phase: SessionPhase::CreatePending
            })]
        );
        assert_eq!(creates(&shared).len(), 1);
        assert_eq!(coordinator.phase(), SessionPhase::CreatePending);
    }

    #[test]
    fn create_during_destroy_keeps_destroy_pending() {
        let (mut coordinator, shared) = coordinator("NULL");
        mark_backend_session(&shared);
        coordinator.request_host("A");

        assert_eq!(
            coordinator.create_session(),
            vec![MenuEffect::Failed(SessionError::OperationPending {
                phase: SessionPhase::DestroyPending
            })]
        );
        assert!(creates(&shared).is_empty());

        // the destroy completion is still recognised and recreates once
        shared.lock().unwrap().named = None;
        coordinator.on_destroy_session_complete(&game(), true);
        assert_eq!(creates(&shared).len(), 1);
        assert_eq!(coordinator.phase(), SessionPhase::CreatePending);
    }

    #[test]
    fn start_without_session_reports_no_active_session() {
        let (mut coordinator, shared) = coordinator("NULL");
        assert_eq!(
            coordinator.start_session(),
            vec![MenuEffect::Failed(SessionError::NoActiveSession)]
        );
        assert!(calls(&shared).is_empty());
    }

    #[test]
    fn refresh_issues_presence_query() {
        let (mut coordinator, shared) = coordinator("NULL");
        coordinator.refresh_server_list();
        let issued = calls(&shared);
        let [Call::Find(_, query)] = issued.as_slice() else {
            panic!("expected one find, got {issued:?}");
        };
        assert_eq!(*query, SearchQuery::presence(100));
    }

    #[test]
    fn find_completion_builds_server_list() {
        let (coordinator, _shared) = with_results(vec![found("s1", Some("Foo"), 4, 1)]);
        let cache = coordinator.search_results().unwrap();
        assert_eq!(cache.len(), 1);

        let result = cache.get(0).unwrap();
        assert_eq!(result.display_name, "Foo");
        assert_eq!(result.max_players, 4);
        assert_eq!(result.current_players, 3);
    }

    #[test]
    fn find_completion_notifies_menu_in_backend_order() {
        let (mut coordinator, shared) = coordinator("NULL");
        coordinator.refresh_server_list();
        let search = pending_search(&shared);

        let effects = coordinator.on_find_sessions_complete(
            search,
            true,
            vec![found("b", Some("Beta"), 4, 4), found("a", None, 2, 0)],
        );
        let [MenuEffect::ServerListUpdated(list)] = effects.as_slice() else {
            panic!("expected server list, got {effects:?}");
        };
        assert_eq!(list[0].display_name, "Beta");
        assert_eq!(list[1].display_name, "Could not find name");
        assert_eq!(list[1].current_players, 2);
    }

    #[test]
    fn failed_or_stale_search_is_a_no_op() {
        let (mut coordinator, shared) = with_results(vec![found("old", Some("Old"), 4, 4)]);

        coordinator.refresh_server_list();
        let search = pending_search(&shared);
        assert!(coordinator
            .on_find_sessions_complete(search, false, Vec::new())
            .is_empty());
        assert_eq!(coordinator.search_results().unwrap().len(), 1);

        // completion for a search that was superseded
        coordinator.refresh_server_list();
        let first = pending_search(&shared);
        coordinator.refresh_server_list();
        assert!(coordinator
            .on_find_sessions_complete(first, true, Vec::new())
            .is_empty());
        assert_eq!(coordinator.search_results().unwrap().len(), 1);
    }

    #[test]
    fn join_out_of_range_issues_nothing() {
        let (mut coordinator, shared) = with_results(vec![found("s1", Some("Foo"), 4, 1)]);
        let before = calls(&shared).len();

        let effects = coordinator.join_by_index(1);
        assert_eq!(
            effects,
            vec![MenuEffect::Failed(SessionError::JoinIndexOutOfRange {
                index: 1,
                len: 1
            })]
        );
        assert_eq!(calls(&shared).len(), before);
    }

    #[test]
    fn join_without_search_or_backend_is_silent() {
        let (mut coordinator, shared) = coordinator("NULL");
        assert!(coordinator.join_by_index(0).is_empty());
        assert!(calls(&shared).is_empty());

        let mut detached = SessionCoordinator::new(CoordinatorConfig::default(), None);
        assert!(detached.join_by_index(0).is_empty());
        assert!(detached.request_host("Arena").is_empty());
        assert!(detached.refresh_server_list().is_empty());
    }

    #[test]
    fn join_tears_down_and_travels_to_resolved_address() {
        let (mut coordinator, shared) = with_results(vec![found("s1", Some("Foo"), 4, 1)]);

        assert_eq!(coordinator.join_by_index(0), vec![MenuEffect::Teardown]);
        assert!(calls(&shared).contains(&Call::Join(game(), "s1".into())));
        assert_eq!(coordinator.phase(), SessionPhase::JoinPending);

        shared.lock().unwrap().connect_string = Some("192.168.0.4:7777".into());
        let effects = coordinator.on_join_session_complete(&game(), JoinSessionResult::Success);
        let travels: Vec<_> = effects
            .iter()
            .filter(|effect| matches!(effect, MenuEffect::JoinResolved { .. }))
            .collect();
        assert_eq!(
            travels,
            vec![&MenuEffect::JoinResolved {
                address: "192.168.0.4:7777".into()
            }]
        );
        assert!(!coordinator.active_session().unwrap().hosting);
    }

    #[test]
    fn unresolved_connect_string_never_travels() {
        let (mut coordinator, _shared) = with_results(vec![found("s1", Some("Foo"), 4, 1)]);
        coordinator.join_by_index(0);

        let effects = coordinator.on_join_session_complete(&game(), JoinSessionResult::Success);
        assert_eq!(
            effects,
            vec![MenuEffect::Failed(SessionError::ResolveConnectFailed { name: game() })]
        );
        assert_eq!(coordinator.phase(), SessionPhase::Absent);
    }

    #[test]
    fn unsuccessful_join_result_is_reported() {
        let (mut coordinator, shared) = with_results(vec![found("s1", Some("Foo"), 4, 0)]);
        shared.lock().unwrap().connect_string = Some("192.168.0.4:7777".into());
        coordinator.join_by_index(0);

        let effects =
            coordinator.on_join_session_complete(&game(), JoinSessionResult::SessionIsFull);
        assert_eq!(
            effects,
            vec![MenuEffect::Failed(SessionError::JoinFailed {
                result: JoinSessionResult::SessionIsFull
            })]
        );
    }

    #[test]
    fn completions_for_other_sessions_are_ignored() {
        let (mut coordinator, _shared) = coordinator("NULL");
        coordinator.request_host("Arena");
        let other = SessionName::new("PartySession");

        assert!(coordinator.on_create_session_complete(&other, true).is_empty());
        assert_eq!(coordinator.phase(), SessionPhase::CreatePending);
    }

    #[test]
    fn main_menu_uses_configured_map() {
        let (mut coordinator, _shared) = coordinator("NULL");
        assert_eq!(
            coordinator.load_main_menu(),
            vec![MenuEffect::MainMenuRequested {
                url: "/Game/MenuSystem/Menu".into()
            }]
        );
    }
}
