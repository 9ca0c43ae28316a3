//! PhotoPool Daemon - random photo-of-the-moment HTTP service

mod generate;
mod http;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use photopool::{Dataset, PoolReader, PoolWriter};
use photostore::{RedisStore, Store, StorePolicy};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the dataset into the cache and serve random photos over HTTP
    Serve {
        /// Bind address
        #[arg(short, long, default_value = "127.0.0.1:8000")]
        bind: String,

        /// Cache store URL
        #[arg(short, long, default_value = "redis://127.0.0.1:6379/0")]
        redis_url: String,

        /// Dataset file
        #[arg(short, long, default_value = "./photos.csv")]
        dataset: String,

        /// Store call deadline in milliseconds
        #[arg(long, default_value_t = 5000)]
        store_timeout_ms: u64,
    },

    /// Write a randomly generated dataset file
    Generate {
        /// Output file
        #[arg(short, long, default_value = "./photos.csv")]
        out: String,

        /// Number of records
        #[arg(short, long, default_value_t = 30)]
        count: usize,

        /// Base URL for generated photo links
        #[arg(long, default_value = "http://localhost:8000")]
        site_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match Args::parse().command {
        Command::Serve {
            bind,
            redis_url,
            dataset,
            store_timeout_ms,
        } => serve(&bind, &redis_url, &dataset, store_timeout_ms).await,
        Command::Generate {
            out,
            count,
            site_url,
        } => {
            generate::run(&out, count, &site_url)?;
            println!("Wrote {} records to {}", count, out);
            Ok(())
        }
    }
}

async fn serve(
    bind: &str,
    redis_url: &str,
    dataset_path: &str,
    store_timeout_ms: u64,
) -> Result<()> {
    info!("Starting PhotoPool Daemon v{}", env!("CARGO_PKG_VERSION"));
    info!("Dataset: {}", dataset_path);

    let policy = StorePolicy {
        timeout: Duration::from_millis(store_timeout_ms),
    };
    let store: Arc<dyn Store> = Arc::new(RedisStore::connect(redis_url, policy).await?);
    info!("Connected to cache store at {}", redis_url);

    let dataset = Dataset::from_path(dataset_path);
    let loaded = PoolWriter::new(Arc::clone(&store)).write(&dataset).await?;
    info!("Loaded {} photos into the pool", loaded);

    let reader = Arc::new(PoolReader::new(Arc::clone(&store)));
    let app = http::router(http::AppState { store, reader });

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Server listening on {}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}
