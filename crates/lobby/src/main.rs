mod commands;
mod config;
mod console;

use std::io::BufRead;
use std::path::PathBuf;

use app::{AppBuilder, Application};
use clap::Parser;
use color_eyre::eyre::{Report, Result, WrapErr};
use null_backend::{LanRegistry, NullBackendConfig, NullSessionBackend};
use session::runtime::SessionRuntime;
use session::{MenuCommand, SessionCoordinator, SessionDriver};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::LobbyConfig;
use crate::console::{ConsoleMenu, LogMenu};

struct Lobby;

impl Application for Lobby {
    const APP_ID: &'static str = "lobby";
}

#[derive(Parser)]
#[command(name = "lobby")]
#[command(about = "Host, find and join sessions on a simulated LAN")]
struct Args {
    /// TOML file with `[session]` and `[backend]` tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name shown to other players
    #[arg(short, long)]
    player: Option<String>,

    /// Address clients travel to when joining a session hosted here
    #[arg(short, long)]
    address: Option<String>,

    /// Number of headless hosts advertising a session next to this player
    #[arg(long, default_value_t = 0)]
    demo_hosts: usize,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let _app = AppBuilder::<Lobby>::new(env!("CARGO_PKG_VERSION"))
        .map_err(Report::msg)?
        .build_simple();

    let mut config = match &args.config {
        Some(path) => LobbyConfig::load(path)
            .wrap_err_with(|| format!("loading {}", path.display()))?,
        None => LobbyConfig::default(),
    };
    if let Some(player) = args.player {
        config.backend.user_name = player;
    }
    if let Some(address) = args.address {
        config.backend.host_address = address;
    }

    let runtime = SessionRuntime::multi_thread(2)?;
    runtime.block_on(run_lobby(config, args.demo_hosts));
    Ok(())
}

async fn run_lobby(config: LobbyConfig, demo_hosts: usize) {
    let registry = LanRegistry::new();
    let demos: Vec<DemoHost> = (1..=demo_hosts)
        .map(|index| DemoHost::spawn(&registry, &config, index))
        .collect();

    let (events_tx, events_rx) = unbounded_channel();
    let backend = NullSessionBackend::new(registry.clone(), config.backend, events_tx);
    let coordinator = SessionCoordinator::new(config.session, Some(Box::new(backend)));
    let mut driver = SessionDriver::new(coordinator, ConsoleMenu::default(), events_rx);

    println!("{}", commands::HELP);
    let (commands_tx, commands_rx) = unbounded_channel();
    read_commands(commands_tx);
    driver.run(commands_rx).await;
    if let Some(location) = driver.notifier().location() {
        debug!("last travel: {location}");
    }

    for demo in demos {
        demo.stop().await;
    }
    info!("lobby closed");
}

/// Forwards parsed stdin lines until `quit` or end of input.
///
/// Runs on a plain thread; a blocking stdin read must not hold up runtime shutdown.
fn read_commands(commands: UnboundedSender<MenuCommand>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match commands::parse(&line) {
                Ok(command) => {
                    let quit = command == MenuCommand::Quit;
                    if commands.send(command).is_err() || quit {
                        break;
                    }
                }
                Err(commands::ParseError::Empty) => {}
                Err(err) => println!("{err}\n{}", commands::HELP),
            }
        }
        debug!("stdin reader finished");
    });
}

/// Headless player hosting "Demo Server #<index>" on the shared registry.
struct DemoHost {
    commands: UnboundedSender<MenuCommand>,
    task: JoinHandle<()>,
}

impl DemoHost {
    fn spawn(registry: &LanRegistry, config: &LobbyConfig, index: usize) -> Self {
        let name = format!("demo-{index}");
        let backend_config = NullBackendConfig {
            user_name: name.clone(),
            host_address: format!("127.0.0.1:{}", 7777 + index),
            latency_ms: config.backend.latency_ms,
        };

        let (events_tx, events_rx) = unbounded_channel();
        let backend = NullSessionBackend::new(registry.clone(), backend_config, events_tx);
        let coordinator = SessionCoordinator::new(config.session.clone(), Some(Box::new(backend)));
        let mut driver = SessionDriver::new(coordinator, LogMenu::new(name), events_rx);

        let (commands, commands_rx) = unbounded_channel();
        // Cannot fail, the receiver is still in hand.
        let _ = commands.send(MenuCommand::Host(format!("Demo Server #{index}")));
        let task = tokio::spawn(async move { driver.run(commands_rx).await });
        Self { commands, task }
    }

    async fn stop(self) {
        let _ = self.commands.send(MenuCommand::Quit);
        if let Err(err) = self.task.await {
            debug!("demo host ended abnormally: {err}");
        }
    }
}
