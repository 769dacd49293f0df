//! Repository traits and the user persistence model
//!
//! - [`Repository`]: generic CRUD trait written with RPITIT
//! - [`RepositoryError`]: structured error classified from driver errors
//! - [`SqlxUserRepository`]: the sqlx implementation for [`crate::models::User`]
//!
//! # Example
//!
//! ```rust,no_run
//! use users_service::database::connect_in_memory;
//! use users_service::models::UserPayload;
//! use users_service::repository::{Repository, SqlxUserRepository};
//!
//! # async fn run() -> users_service::error::Result<()> {
//! let repo = SqlxUserRepository::new(connect_in_memory().await?);
//! let _user = repo.create(UserPayload::new("Ana", "ana@x.com")).await;
//! # Ok(())
//! # }
//! ```

mod error;
mod traits;
mod users;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use traits::{Repository, RepositoryResult};
pub use users::SqlxUserRepository;
