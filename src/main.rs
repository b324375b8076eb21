use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use jira_relay_bot::application::messaging::{CommandHandler, EventDispatcher};
use jira_relay_bot::application::services::{DestinationResolver, NotificationFormatter, NotificationService};
use jira_relay_bot::application::session::SessionManager;
use jira_relay_bot::domain::traits::{DestinationStore, MessageSender, SessionTransport};
use jira_relay_bot::infrastructure::adapters::{BridgeTransport, ConsoleTransport};
use jira_relay_bot::infrastructure::config::{Config, SessionAdapter};
use jira_relay_bot::infrastructure::http::{self, AppState};
use jira_relay_bot::infrastructure::storage::FileDestinationStore;

#[derive(Parser)]
#[command(name = "jira-relay-bot")]
#[command(about = "Relays Jira issue notifications to a WhatsApp group", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the session and the HTTP server
    Run,
    /// Start only the session (pairing, /group handling)
    Bot,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => start(&cli.config, true),
        Commands::Bot => start(&cli.config, false),
        Commands::Version => {
            println!("jira-relay-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => init_config(),
    }
}

fn start(config_path: &Path, with_http: bool) {
    let config = match Config::load_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(config, with_http)) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config, with_http: bool) -> std::io::Result<()> {
    tracing::info!("Starting {}", config.bot.name);

    let transport: Arc<dyn SessionTransport> = match config.session.adapter {
        SessionAdapter::Bridge => Arc::new(
            BridgeTransport::new(&config.session.bridge_url, &config.session.name, config.session_store())
                .with_poll_timeout(std::time::Duration::from_secs(config.session.poll_timeout_secs)),
        ),
        SessionAdapter::Console => Arc::new(ConsoleTransport::new()),
    };

    let session = Arc::new(SessionManager::new(transport).with_connect_timeout(config.connect_timeout()));
    let store: Arc<dyn DestinationStore> = Arc::new(FileDestinationStore::new(config.destination_file()));
    let sender: Arc<dyn MessageSender> = session.clone();

    match &config.destination.fallback {
        Some(fallback) => tracing::info!("Fallback destination: {}", fallback),
        None => tracing::info!("No fallback destination, waiting for /group"),
    }
    tracing::info!("Active destination file: {}", config.destination_file().display());

    let commands = CommandHandler::new(Arc::clone(&store), Arc::clone(&sender));
    let dispatcher = Arc::new(EventDispatcher::new(commands, Arc::clone(&sender)));
    dispatcher.register(&session);

    if session.start().await {
        tracing::info!("Session ready");
    } else if with_http {
        tracing::info!("Open GET /qr to pair the session");
    }

    if with_http {
        let notifications = Arc::new(NotificationService::new(
            sender,
            DestinationResolver::new(store, config.destination.fallback.clone()),
            NotificationFormatter::new(&config.webhook.issue_base_url),
        ));
        if config.webhook_secret().is_none() {
            tracing::warn!("No webhook secret configured, /webhook/jira accepts any caller");
        }

        let state = AppState {
            session: Arc::clone(&session),
            notifications,
            secret: config.webhook_secret().map(str::to_string),
        };
        http::serve(state, &config.listen_addr(), shutdown_signal()).await?;
    } else {
        shutdown_signal().await;
    }

    session.stop();
    tracing::info!("Stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            // Only YAML on stdout
            print!("{}", yaml);
            eprintln!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => {
            tracing::error!("Failed to render default config: {}", e);
            std::process::exit(1);
        }
    }
}
