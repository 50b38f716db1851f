//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{AuthorRepository, PostRepository};
use blog_infra::InMemoryStore;
use blog_infra::database::DatabaseConfig;

#[cfg(feature = "postgres")]
use blog_infra::database::{
    DatabaseConnections, PostgresAuthorRepository, PostgresPostRepository,
};

/// Shared application state, built once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    /// Backend name reported by the health check.
    pub storage: &'static str,
    #[cfg(feature = "postgres")]
    db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// State over a fresh in-memory store.
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            posts: store.clone(),
            authors: store,
            storage: "memory",
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Build the application state, connecting to the database when configured.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> anyhow::Result<Self> {
        let Some(config) = db_config else {
            tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
            return Ok(Self::in_memory());
        };

        #[cfg(feature = "postgres")]
        {
            let connections = DatabaseConnections::init(config).await?;
            let main = connections.main.clone();

            tracing::info!("Application state initialized (postgres)");
            Ok(Self {
                posts: Arc::new(PostgresPostRepository::new(main.clone())),
                authors: Arc::new(PostgresAuthorRepository::new(main)),
                storage: "postgres",
                db: Some(Arc::new(connections)),
            })
        }

        #[cfg(not(feature = "postgres"))]
        {
            let _ = config;
            tracing::warn!(
                "Built without postgres feature; ignoring DATABASE_URL and using the in-memory store"
            );
            Ok(Self::in_memory())
        }
    }

    /// Release the store connection.
    pub async fn shutdown(&self) {
        #[cfg(feature = "postgres")]
        if let Some(db) = &self.db {
            if let Err(e) = db.close().await {
                tracing::error!(error = %e, "Failed to close database connection");
            }
        }

        tracing::info!("Application state shut down");
    }
}
