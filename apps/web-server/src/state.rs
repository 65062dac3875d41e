//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::Paginator;
use blogicum_core::ports::{
    CategoryRepository, Clock, CommentRepository, LocationRepository, PostRepository,
    SystemClock, UserRepository,
};
use blogicum_infra::{DatabaseConfig, InMemoryStore};

#[cfg(feature = "postgres")]
use blogicum_infra::database::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    DbConn, PostgresPostRepository, PostgresUserRepository, connect,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub clock: Arc<dyn Clock>,
    pub paginator: Paginator,
}

impl AppState {
    /// Build the application state, falling back to the in-memory store when
    /// no database is configured or reachable.
    pub async fn new(db_config: Option<&DatabaseConfig>, paginator: Paginator) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        #[cfg(feature = "postgres")]
        let state = match db_config {
            Some(config) => match connect(config).await {
                Ok(conn) => Self::postgres(conn, clock, paginator),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory(&InMemoryStore::new(), clock, paginator)
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory(&InMemoryStore::new(), clock, paginator)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            if db_config.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            tracing::info!("Running without postgres feature - using in-memory store");
            Self::in_memory(&InMemoryStore::new(), clock, paginator)
        };

        tracing::info!(per_page = paginator.per_page(), "Application state initialized");
        state
    }

    /// State backed by an in-memory store.
    pub fn in_memory(store: &InMemoryStore, clock: Arc<dyn Clock>, paginator: Paginator) -> Self {
        Self {
            users: store.users(),
            categories: store.categories(),
            locations: store.locations(),
            posts: store.posts(),
            comments: store.comments(),
            clock,
            paginator,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(conn: DbConn, clock: Arc<dyn Clock>, paginator: Paginator) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
            locations: Arc::new(PostgresLocationRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn)),
            clock,
            paginator,
        }
    }
}
