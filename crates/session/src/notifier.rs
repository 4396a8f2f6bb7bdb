//! Effects produced by coordinator transitions and their dispatch to the menu.

use crate::error::SessionError;
use crate::search::SearchResult;

/// Side effect requested by a coordinator transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEffect {
    /// Close the currently shown menu.
    Teardown,
    ServerListUpdated(Vec<SearchResult>),
    /// Session created; the host travels to the lobby map as listen server.
    HostingSucceeded { lobby_url: String },
    /// Join resolved; the client travels to `address`.
    JoinResolved { address: String },
    MainMenuRequested { url: String },
    /// Short on-screen message.
    Status(String),
    Failed(SessionError),
}

impl MenuEffect {
    pub fn dispatch(self, notifier: &mut dyn MenuNotifier) {
        match self {
            MenuEffect::Teardown => notifier.on_teardown_requested(),
            MenuEffect::ServerListUpdated(list) => notifier.on_server_list_updated(&list),
            MenuEffect::HostingSucceeded { lobby_url } => notifier.on_hosting_succeeded(&lobby_url),
            MenuEffect::JoinResolved { address } => notifier.on_join_resolved(&address),
            MenuEffect::MainMenuRequested { url } => notifier.on_main_menu_requested(&url),
            MenuEffect::Status(message) => notifier.on_status(&message),
            MenuEffect::Failed(error) => notifier.on_error(&error),
        }
    }
}

/// Menu side of the coordinator. Travel happens in the implementor.
pub trait MenuNotifier {
    fn on_teardown_requested(&mut self);

    fn on_server_list_updated(&mut self, list: &[SearchResult]);

    fn on_hosting_succeeded(&mut self, lobby_url: &str);

    fn on_join_resolved(&mut self, address: &str);

    fn on_main_menu_requested(&mut self, url: &str);

    fn on_status(&mut self, _message: &str) {}

    fn on_error(&mut self, _error: &SessionError) {}
}
