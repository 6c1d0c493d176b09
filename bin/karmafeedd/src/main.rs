//! `karmafeedd` — the KarmaFeed server binary.
//!
//! Usage:
//!   karmafeedd -c <context-name-or-path> [--listen <addr>] [--seed]
//!
//! The context name resolves to `/etc/karmafeed/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use karmafeed_core::Module;
use tracing::info;

use config::ServerConfig;

/// KarmaFeed server.
#[derive(Parser, Debug)]
#[command(name = "karmafeedd", about = "KarmaFeed server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides default 0.0.0.0:8080).
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Insert a small demo dataset on startup (idempotent).
    #[arg(long = "seed", default_value_t = false)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = karmafeed_core::ServiceConfig {
        data_dir: Some(data_dir.clone()),
        listen: cli.listen.clone(),
        ..Default::default()
    };

    let sql: Arc<dyn karmafeed_sql::SQLStore> = Arc::new(
        karmafeed_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    let feed_module = feed::FeedModule::new(Arc::clone(&sql), server_config.feed_config())?;
    info!("Feed module initialized");

    if cli.seed {
        bootstrap::seed_demo_data(&feed_module.service())?;
    }

    let module_routes = vec![(feed_module.name(), feed_module.routes())];

    // Build router.
    let app = routes::build_router(module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("KarmaFeed server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
