//! Menu notifiers of the lobby binary.

use session::{MenuNotifier, SearchResult, SessionError};
use tracing::{info, warn};

/// Prints every menu effect to stdout, standing in for the menu widgets.
#[derive(Debug, Default)]
pub struct ConsoleMenu {
    /// Map or address of the last travel, shown in the prompt.
    location: Option<String>,
}

impl ConsoleMenu {
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

pub fn format_server_list(list: &[SearchResult]) -> String {
    if list.is_empty() {
        return "no sessions found".to_owned();
    }
    list.iter()
        .enumerate()
        .map(|(index, result)| {
            format!(
                "[{index}] {:<24} {:<12} {}/{}",
                result.display_name, result.host_username, result.current_players, result.max_players
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl MenuNotifier for ConsoleMenu {
    fn on_teardown_requested(&mut self) {
        println!("-- menu closed --");
    }

    fn on_server_list_updated(&mut self, list: &[SearchResult]) {
        println!("{}", format_server_list(list));
    }

    fn on_hosting_succeeded(&mut self, lobby_url: &str) {
        println!("travelling to {lobby_url}");
        self.location = Some(lobby_url.to_owned());
    }

    fn on_join_resolved(&mut self, address: &str) {
        println!("connecting to {address}");
        self.location = Some(address.to_owned());
    }

    fn on_main_menu_requested(&mut self, url: &str) {
        println!("back to {url}");
        self.location = Some(url.to_owned());
    }

    fn on_status(&mut self, message: &str) {
        println!("> {message}");
    }

    fn on_error(&mut self, error: &SessionError) {
        println!("! {error}");
    }
}

/// Notifier of the headless demo hosts; everything goes to the log.
#[derive(Debug)]
pub struct LogMenu {
    name: String,
}

impl LogMenu {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl MenuNotifier for LogMenu {
    fn on_teardown_requested(&mut self) {}

    fn on_server_list_updated(&mut self, list: &[SearchResult]) {
        info!("{}: {} sessions listed", self.name, list.len());
    }

    fn on_hosting_succeeded(&mut self, lobby_url: &str) {
        info!("{}: hosting on {lobby_url}", self.name);
    }

    fn on_join_resolved(&mut self, address: &str) {
        info!("{}: joined {address}", self.name);
    }

    fn on_main_menu_requested(&mut self, _url: &str) {}

    fn on_error(&mut self, error: &SessionError) {
        warn!("{}: {error}", self.name);
    }
}
