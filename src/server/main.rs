mod auth;
mod config;
mod error;
mod game;
mod generator;
mod items;
mod npcs;
mod render;
mod routes;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use crate::auth::AuthService;
use crate::config::{Config, SharedConfig};
use crate::game::GameService;
use crate::generator::MapGenerator;
use crate::items::ItemService;
use crate::npcs::NpcService;
use crate::render::RenderService;
use crate::store::{MemoryStore, PgStore, Store};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file. Watched for changes while the server runs.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the config file.
    #[arg(long)]
    bind: Option<String>,

    /// Log level (off, error, warn, info, debug, trace), overriding the config file.
    #[arg(long)]
    log_level: Option<String>,
}

/// Everything a request handler can reach. All services share one store.
pub struct Server {
    generator: MapGenerator,
    auth: AuthService,
    items: ItemService,
    npcs: NpcService,
    game: GameService,
    render: RenderService,
}

impl Server {
    fn new(store: Arc<dyn Store>, config: SharedConfig) -> Self {
        Self {
            generator: MapGenerator::new(store.clone(), config.clone()),
            auth: AuthService::new(store.clone()),
            items: ItemService::new(store.clone()),
            npcs: NpcService::new(store.clone()),
            game: GameService::new(store.clone()),
            render: RenderService::new(store, config),
        }
    }
}

async fn open_store(config: &SharedConfig) -> anyhow::Result<Arc<dyn Store>> {
    let (database_url, apply_schema) = {
        let config = config.read();
        (config.database_url.clone(), config.apply_schema)
    };

    let Some(url) = database_url else {
        info!("no database_url configured, keeping data in memory");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let store = PgStore::connect(&url).await.context("failed to connect to database")?;
    if apply_schema {
        store.apply_schema().await.context("failed to apply database schema")?;
    }
    info!("connected to database");
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logging comes up after the config so its level can come from the file;
    // config load problems are reported once the logger exists.
    let (file_config, load_error) = Config::load_or_default(args.config.as_deref());
    let level = args.log_level.clone().unwrap_or_else(|| file_config.log_level.clone());
    env_logger::Builder::new()
        .parse_filters(&level)
        .parse_env("RUST_LOG")
        .init();
    if let (Some(path), Some(e)) = (&args.config, load_error) {
        warn!("Failed to load config {}: {}, using default", path.display(), e);
    }

    let config = config::create_shared_config(file_config, args.config.as_deref());
    let bind_address = args.bind.unwrap_or_else(|| config.read().bind_address.clone());

    let store = open_store(&config).await?;
    let server = Arc::new(Server::new(store, config));
    let app = routes::router(server);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!("maze server listening on {}", bind_address);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
