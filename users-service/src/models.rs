//! User entity and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A persisted user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier assigned by the database on creation
    #[schema(example = 1)]
    pub id: i64,

    /// Display name
    #[schema(example = "Ana")]
    pub name: String,

    /// Contact email (no format is enforced)
    #[schema(example = "ana@x.com")]
    pub email: String,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last saved
    pub updated_at: DateTime<Utc>,
}

/// Body accepted by the create and update endpoints
///
/// Both fields are optional at the JSON level. Missing values are written as
/// NULL and rejected by the schema, so presence is enforced by persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserPayload {
    /// User name
    #[schema(example = "Ana")]
    pub name: Option<String>,

    /// User email
    #[schema(example = "ana@x.com")]
    pub email: Option<String>,
}

impl UserPayload {
    /// Payload with both fields present
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }
}
