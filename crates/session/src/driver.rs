//! Single-threaded event loop around a [`SessionCoordinator`].
//!
//! Menu commands and backend completions are both queued; the driver applies
//! them one at a time and hands the resulting effects to the notifier. This is
//! the only place where coordinator state changes, so no locking is needed.

use std::ops::ControlFlow;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, trace};

use crate::backend::BackendEvent;
use crate::coordinator::SessionCoordinator;
use crate::notifier::{MenuEffect, MenuNotifier};

const LOG_TARGET: &str = "session::driver";

/// Requests coming from the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    Host(String),
    RefreshServerList,
    Join(usize),
    StartSession,
    LoadMainMenu,
    Quit,
}

pub struct SessionDriver<N> {
    coordinator: SessionCoordinator,
    notifier: N,
    events: UnboundedReceiver<BackendEvent>,
}

impl<N: MenuNotifier> SessionDriver<N> {
    pub fn new(
        coordinator: SessionCoordinator,
        notifier: N,
        events: UnboundedReceiver<BackendEvent>,
    ) -> Self {
        Self {
            coordinator,
            notifier,
            events,
        }
    }

    pub fn coordinator(&self) -> &SessionCoordinator {
        &self.coordinator
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Applies one menu command. Breaks on [`MenuCommand::Quit`].
    pub fn handle_command(&mut self, command: MenuCommand) -> ControlFlow<()> {
        debug!(target: LOG_TARGET, "menu command {command:?}");
        let effects = match command {
            MenuCommand::Host(name) => self.coordinator.request_host(name),
            MenuCommand::RefreshServerList => self.coordinator.refresh_server_list(),
            MenuCommand::Join(index) => self.coordinator.join_by_index(index),
            MenuCommand::StartSession => self.coordinator.start_session(),
            MenuCommand::LoadMainMenu => self.coordinator.load_main_menu(),
            MenuCommand::Quit => return ControlFlow::Break(()),
        };
        self.apply(effects);
        ControlFlow::Continue(())
    }

    pub fn handle_event(&mut self, event: BackendEvent) {
        debug!(target: LOG_TARGET, "backend event {event:?}");
        let effects = match event {
            BackendEvent::CreateSessionComplete { name, success } => {
                self.coordinator.on_create_session_complete(&name, success)
            }
            BackendEvent::DestroySessionComplete { name, success } => {
                self.coordinator.on_destroy_session_complete(&name, success)
            }
            BackendEvent::FindSessionsComplete {
                search,
                success,
                results,
            } => self
                .coordinator
                .on_find_sessions_complete(search, success, results),
            BackendEvent::JoinSessionComplete { name, result } => {
                self.coordinator.on_join_session_complete(&name, result)
            }
        };
        self.apply(effects);
    }

    /// Handles every completion already queued and returns how many there were.
    ///
    /// Completions queued while pumping (e.g. a recreate after a destroy) are
    /// handled in the same call.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Runs until [`MenuCommand::Quit`] or until the command queue closes.
    pub async fn run(&mut self, mut commands: UnboundedReceiver<MenuCommand>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        if self.handle_command(command).is_break() {
                            break;
                        }
                    }
                    None => break,
                },
                Some(event) = self.events.recv() => self.handle_event(event),
            }
        }
        debug!(target: LOG_TARGET, "session driver stopped");
    }

    fn apply(&mut self, effects: Vec<MenuEffect>) {
        for effect in effects {
            trace!(target: LOG_TARGET, "effect {effect:?}");
            effect.dispatch(&mut self.notifier);
        }
    }
}
