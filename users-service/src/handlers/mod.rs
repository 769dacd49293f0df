//! REST handlers
//!
//! - [`users`]: the five CRUD handlers for `/users`
//! - [`ApiError`]: handler-boundary error rendered as status + plain text

mod error;
pub mod users;

pub use error::{ApiError, ApiErrorKind, ApiOperation};
pub use users::{create_user, delete_user, get_user, list_users, update_user};
