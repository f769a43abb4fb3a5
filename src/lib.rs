pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod services;

use std::sync::Arc;

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub booking: services::BookingEngine,
    pub config: config::Config,
}

impl AppState {
    pub async fn new(config: config::Config) -> Result<Arc<Self>, Box<dyn std::error::Error>> {
        let db = database::Database::connect(&config.database).await?;

        db.run_migrations().await?;

        let booking = services::BookingEngine::new(db.pool.clone());
        Ok(Arc::new(Self {
            db,
            booking,
            config,
        }))
    }

    /// State over an already-connected pool; used by the router-level tests.
    pub fn with_pool(pool: sqlx::PgPool, config: config::Config) -> Arc<Self> {
        let db = database::Database { pool };
        let booking = services::BookingEngine::new(db.pool.clone());
        Arc::new(Self {
            db,
            booking,
            config,
        })
    }
}

/// The full API router, as served under `/api`.
pub fn api_router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .nest("/api", controllers::routes())
        .with_state(state)
}
