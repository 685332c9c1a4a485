use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proctor_config::{EpilogueSettings, Settings, load_room_config};
use proctor_core::{
    Broker, Finalizer, Manager, MemoryStorage, SqliteStorage, StorageBackend, epilogue,
};
use proctor_server::{AppState, api_router};

/// Command line arguments for the Proctor room server
#[derive(Parser, Debug)]
#[command(name = "proctor-server")]
#[command(about = "Single-room coordination broker for competition platforms")]
struct Args {
    /// Directory holding rules.yaml and credentials.yaml
    #[arg(long, env = "PROCTOR_CONFIG_DIR", default_value = "/etc/proctor")]
    config_dir: PathBuf,

    /// Host the RPC surface binds to
    #[arg(long, env = "PROCTOR_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port the RPC surface binds to
    #[arg(short, long, env = "PROCTOR_PORT", default_value_t = 23579)]
    port: u16,

    /// Room identifier stamped onto the published result
    #[arg(long, env = "PROCTOR_ROOM_ID")]
    room_id: String,

    /// Where the terminal result goes
    #[arg(long, env = "PROCTOR_EPILOGUE", value_enum, default_value = "console")]
    epilogue: EpilogueKind,

    /// AMQP endpoint for the queue epilogue
    #[arg(long, env = "PROCTOR_QUEUE_URI", default_value = "amqp://127.0.0.1:5672")]
    queue_uri: String,

    /// Queue name for the queue epilogue
    #[arg(long, env = "PROCTOR_QUEUE_NAME", default_value = "room-results")]
    queue_name: String,

    /// Storage backend for messages, users and rules
    #[arg(long, env = "PROCTOR_STORAGE", value_enum, default_value = "sqlite")]
    storage: StorageKind,

    /// On-disk database path for the sqlite backend; in-memory when absent
    #[arg(long, env = "PROCTOR_DB_PATH")]
    db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum EpilogueKind {
    Console,
    Queue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum StorageKind {
    Sqlite,
    Memory,
}

impl Args {
    fn settings(&self) -> anyhow::Result<Settings> {
        let listen: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .context("invalid listen address")?;

        let epilogue = match self.epilogue {
            EpilogueKind::Console => EpilogueSettings::Console,
            EpilogueKind::Queue => EpilogueSettings::Queue {
                uri: self.queue_uri.clone(),
                queue: self.queue_name.clone(),
            },
        };

        Ok(Settings {
            config_dir: self.config_dir.clone(),
            listen,
            room_id: self.room_id.clone(),
            epilogue,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let settings = args.settings()?;

    let room = load_room_config(&settings.config_dir).context("could not load room config")?;
    info!(
        room = %settings.room_id,
        users = room.users.len(),
        rules = room.rules.len(),
        "room config loaded"
    );

    let storage: Arc<dyn StorageBackend> = match args.storage {
        StorageKind::Sqlite => Arc::new(
            SqliteStorage::open(args.db_path.as_deref(), &room)
                .await
                .context("could not open storage")?,
        ),
        StorageKind::Memory => Arc::new(MemoryStorage::new(&room)),
    };

    let publisher = epilogue::from_settings(&settings.epilogue)
        .await
        .context("could not set up epilogue")?;
    let (finalizer, mut shutdown) = Finalizer::new(&settings.room_id, publisher);
    finalizer.test().await.context("epilogue probe failed")?;

    let broker = Arc::new(Broker::new(storage));
    let manager = Arc::new(Manager::new(Arc::clone(&broker), finalizer));
    let state = AppState { broker, manager };

    let listener = tokio::net::TcpListener::bind(settings.listen)
        .await
        .with_context(|| format!("could not bind {}", settings.listen))?;
    info!(listen = %settings.listen, "serving room");

    let server = axum::serve(listener, api_router(state));
    tokio::select! {
        result = server => result.context("server error")?,
        _ = shutdown.recv() => {
            info!(room = %settings.room_id, "room finalized, shutting down");
        }
    }

    Ok(())
}
