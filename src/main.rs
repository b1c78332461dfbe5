use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dota_watch::api::state::AppState;
use dota_watch::config::AppConfig;
use dota_watch::fetch::OpenDotaClient;
use dota_watch::models::{AccountId, AnalysisResult, HeroCatalog};
use dota_watch::parse_duration;
use dota_watch::poll::{MatchPoller, PollConfig};
use dota_watch::report::{render_analysis, render_poll_report};
use dota_watch::storage::{SeenStore, StorageConfig};
use dota_watch::suggest::{suggest_hero, Position};

#[derive(Parser)]
#[command(name = "dota-watch")]
#[command(about = "Watch Dota 2 players on OpenDota and grade their new matches")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the roster and announce new matches
    Watch {
        /// Poll interval (e.g., "5m", "90s"); defaults to the config value
        #[arg(long)]
        interval: Option<String>,

        /// Run a single tick and exit
        #[arg(long)]
        once: bool,
    },

    /// Analyze every tracked player's latest match, ignoring dedup state
    Check,

    /// Analyze one account's latest match
    Last {
        /// OpenDota account id
        account_id: u64,
    },

    /// Suggest a random hero, optionally for one position
    Suggest {
        /// carry, mid, offlane or support
        #[arg(long)]
        position: Option<String>,

        /// Comment on this account's last match
        #[arg(long)]
        account: Option<u64>,
    },

    /// Start the HTTP API
    Serve {
        /// Bind address; defaults to the config value
        #[arg(long)]
        host: Option<String>,

        /// Port number; defaults to the config value
        #[arg(long)]
        port: Option<u16>,

        /// Do not run the background poll loop
        #[arg(long)]
        no_watch: bool,
    },
}

fn load_config(path: &str) -> Result<AppConfig> {
    let path = PathBuf::from(path);
    if path.exists() {
        AppConfig::from_file(&path).with_context(|| format!("Loading {}", path.display()))
    } else {
        Ok(AppConfig::default())
    }
}

async fn load_heroes(client: &OpenDotaClient) -> HeroCatalog {
    match client.fetch_heroes().await {
        Ok(heroes) => HeroCatalog::new(heroes),
        Err(e) => {
            tracing::warn!("Hero list unavailable, names will show as unknown: {}", e);
            HeroCatalog::default()
        }
    }
}

/// Build the poller, restoring the seen map when persistence is enabled.
async fn build_poller(
    config: &AppConfig,
    poll_config: PollConfig,
    client: Arc<OpenDotaClient>,
) -> MatchPoller {
    let poller = MatchPoller::new(poll_config, client);
    if !config.poll.persist_seen {
        return poller;
    }

    let store = SeenStore::for_config(&StorageConfig::new(config.data_dir.clone()));
    match store.load() {
        Ok(seen) => poller.restore_seen(seen).await,
        Err(e) => tracing::warn!("Could not restore seen matches: {}", e),
    }
    poller.with_store(store)
}

fn print_notification(poller: &MatchPoller, heroes: &HeroCatalog, result: &AnalysisResult) {
    let name = poller
        .find_player(result.account_id)
        .map(|p| p.display_name())
        .unwrap_or_else(|| result.account_id.to_string());
    println!("{}", render_analysis(&name, result, heroes));
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        return;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    // Initialize tracing
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| fmt::layer().json()))
        .with((!cli.json_logs).then(fmt::layer))
        .init();

    tracing::info!("Starting dota-watch v{}", env!("CARGO_PKG_VERSION"));

    let client = Arc::new(OpenDotaClient::new(config.opendota.to_client_config()?)?);
    let heroes = Arc::new(load_heroes(&client).await);

    match cli.command {
        Commands::Watch { interval, once } => {
            let mut poll_config = config.poll_config();
            if let Some(raw) = interval {
                poll_config.interval = parse_duration(&raw)
                    .filter(|d| !d.is_zero())
                    .with_context(|| format!("Invalid --interval: {}", raw))?;
            }
            if poll_config.roster.is_empty() {
                tracing::warn!("No players configured; nothing to watch");
            }

            let poller = Arc::new(build_poller(&config, poll_config, client).await);

            if once {
                let report = poller.tick().await;
                print!("{}", render_poll_report(&report, &heroes));
                for result in report.notifications() {
                    print_notification(&poller, &heroes, result);
                }
                return Ok(());
            }

            let (tx, mut rx) = mpsc::channel(32);
            let handle = tokio::spawn(poller.clone().run_periodic(tx));

            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(result) => print_notification(&poller, &heroes, &result),
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutting down");
                        poller.cancel().await;
                        break;
                    }
                }
            }
            handle.abort();
        }
        Commands::Check => {
            let poller = MatchPoller::new(config.poll_config(), client);
            let report = poller.check_all().await;

            print!("{}", render_poll_report(&report, &heroes));
            for result in report.notifications() {
                print_notification(&poller, &heroes, result);
            }
        }
        Commands::Last { account_id } => {
            let account_id = AccountId::new(account_id);
            let poller = MatchPoller::new(config.poll_config(), client.clone());
            let result = poller.check_one(account_id).await?;
            print_notification(&poller, &heroes, &result);

            match client.fetch_player_profile(account_id).await {
                Ok(profile) => {
                    if let Some(persona) = profile.persona_name() {
                        println!("Profile: {}", persona);
                    }
                    println!("Rank: {}", profile.rank_name());
                }
                Err(e) => tracing::warn!("Rank unavailable for {}: {}", account_id, e),
            }
        }
        Commands::Suggest { position, account } => {
            let position = position.as_deref().map(str::parse::<Position>).transpose()?;

            let latest = match account {
                Some(account_id) => {
                    let poller = MatchPoller::new(config.poll_config(), client);
                    match poller.check_one(AccountId::new(account_id)).await {
                        Ok(result) => Some(result),
                        Err(e) => {
                            tracing::warn!("No last match for {}: {}", account_id, e);
                            None
                        }
                    }
                }
                None => None,
            };

            let suggestion = suggest_hero(&heroes, position, latest.as_ref())?;
            print!("{}", suggestion);
        }
        Commands::Serve {
            host,
            port,
            no_watch,
        } => {
            let poller = Arc::new(build_poller(&config, config.poll_config(), client).await);

            if !no_watch {
                let (tx, mut rx) = mpsc::channel::<AnalysisResult>(32);
                tokio::spawn(poller.clone().run_periodic(tx));

                let announcer = poller.clone();
                let catalog = heroes.clone();
                tokio::spawn(async move {
                    while let Some(result) = rx.recv().await {
                        print_notification(&announcer, &catalog, &result);
                    }
                });
            }

            let state = AppState { poller, heroes };
            let addr = format!(
                "{}:{}",
                host.unwrap_or_else(|| config.server.host.clone()),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API listening on http://{}", addr);
            dota_watch::api::serve(listener, state, shutdown_signal()).await?;
        }
    }

    Ok(())
}
