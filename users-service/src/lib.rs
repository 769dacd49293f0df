//! # users-service
//!
//! A small CRUD HTTP service for user records (name and email), backed by
//! SQLite through sqlx and documented with a generated OpenAPI document.
//!
//! ## Routes
//!
//! - `POST /users`, `GET /users`
//! - `GET /users/{id}`, `PUT /users/{id}`, `DELETE /users/{id}`
//! - `GET /api-docs` (Swagger UI) and `GET /api-docs.json`
//! - `GET /health`, `GET /ready`
//!
//! Failures are answered with a status code and a short plain-text message.
//!
//! ## Example
//!
//! ```rust,no_run
//! use users_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::connect(config.clone()).await?;
//!     let app = router(state.clone());
//!
//!     Server::new(config).serve(app).await?;
//!     state.close().await;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod server;
pub mod state;

/// Commonly used types and functions
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{DatabaseOperation, Error, Result};
    pub use crate::handlers::{ApiError, ApiErrorKind, ApiOperation};
    pub use crate::health::{health, readiness};
    pub use crate::models::{User, UserPayload};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        Repository, RepositoryError, RepositoryErrorKind, SqlxUserRepository,
    };
    pub use crate::routes::router;
    pub use crate::server::Server;
    pub use crate::state::AppState;
}
