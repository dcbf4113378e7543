use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use cadence_config::{Config, ConfigLoad, ConfigLoader, ConfigWarnings};
use cadence_core::database::{
    PostgresAccountRepository, PostgresTrackRepository,
};
use cadence_server::{
    AppState, create_app,
    infra::startup::{build_blob_store, connect_database, run_migrations},
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use sqlx::PgPool;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cadence-server")]
#[command(
    about = "Music catalog API with JWT sessions and pluggable media storage"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// TOML configuration file; must exist when given
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Alternative `.env` file
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_runtime_config(&cli.serve)?;

    match cli.command {
        Some(Command::Db(DbCommand::Migrate)) => {
            let pool = connect(&config).await?;
            run_migrations(&pool).await
        }
        None => run_server(config).await,
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &args.env_file {
        loader = loader.with_env_file(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "loaded configuration file");
    }
    log_warnings(&warnings);

    Ok(config)
}

fn log_warnings(warnings: &ConfigWarnings) {
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => warn!(
                message = %warning.message,
                hint = %hint,
                "configuration warning"
            ),
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let url = config.database.url.as_deref().context(
        "no database configured; set DATABASE_URL or \
         DB_HOST/DB_USER/DB_PASSWORD/DB_NAME",
    )?;
    connect_database(url).await
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let pool = connect(&config).await?;
    run_migrations(&pool).await?;

    let blobs = build_blob_store(&config.storage).await?;
    let tracks = Arc::new(PostgresTrackRepository::new(pool.clone()));
    let accounts = Arc::new(PostgresAccountRepository::new(pool));

    let addr = config.server.bind_address();
    let budget = config.limits.request_timeout;
    let storage = config.storage.kind();
    let state = AppState::new(config, tracks, accounts, blobs)?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, storage, ?budget, "starting Cadence server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
