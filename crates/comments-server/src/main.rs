use std::net::SocketAddr;
use std::sync::Arc;

use comments_server::{
    comments::CommentRepository,
    config::StoreBackend,
    create_router,
    db::{DocumentStore, MemoryStore, MongoStore},
    Config,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comments_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::MongoDb => {
            tracing::info!("Using MongoDB database '{}'", config.mongodb_database);
            Arc::new(MongoStore::connect(&config.mongodb_uri, &config.mongodb_database).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; comments will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let comments = CommentRepository::init(&*store, config.schema_failure_policy).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = create_router(comments, config);
    tracing::info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
