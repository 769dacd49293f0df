//! HTTP handlers for the `/users` resource
//!
//! Each handler makes one repository call (two for update and delete, which
//! look the record up first) and maps the outcome to a response. Failures are
//! logged here and reduced to a status code and a short message.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};

use super::error::{ApiError, ApiOperation};
use crate::{
    models::{User, UserPayload},
    repository::{Repository, RepositoryError, RepositoryErrorKind},
    state::AppState,
};

/// Message for a missing user
pub const USER_NOT_FOUND: &str = "User not found";
/// Message for a rejected create
pub const CREATE_FAILED: &str = "Error creating user";
/// Message for a rejected update
pub const UPDATE_FAILED: &str = "Error updating user";
/// Message for a failed delete
pub const DELETE_FAILED: &str = "Error deleting user";
/// Message for a failed read
pub const SERVER_ERROR: &str = "Server error";
/// Acknowledgment returned after a delete
pub const USER_DELETED: &str = "User deleted successfully";

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid data", body = String, content_type = "text/plain")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(payload) = payload.map_err(|e| body_rejected(ApiOperation::Create, e))?;

    let user = state
        .users()
        .create(payload)
        .await
        .map_err(|e| persistence_failure(ApiOperation::Create, e))?;

    tracing::info!(user_id = user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "All stored users", body = Vec<User>),
        (status = 500, description = "Server error", body = String, content_type = "text/plain")
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state
        .users()
        .find_all()
        .await
        .map_err(|e| persistence_failure(ApiOperation::List, e))?;

    tracing::debug!(count = users.len(), "Listed users");
    Ok(Json(users))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = String, content_type = "text/plain"),
        (status = 500, description = "Server error", body = String, content_type = "text/plain")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let id = user_id(ApiOperation::Get, id)?;

    state
        .users()
        .find_by_id(&id)
        .await
        .map_err(|e| persistence_failure(ApiOperation::Get, e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(ApiOperation::Get, USER_NOT_FOUND))
}

/// Replace a user's name and email
///
/// The record is looked up before the body is read, so a missing user answers
/// 404 whatever the body holds. Both fields are written as supplied. An
/// omitted field is not merged with the stored value; it is sent to the
/// database as NULL and the save fails.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "ID of the user to update")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Invalid data", body = String, content_type = "text/plain"),
        (status = 404, description = "User not found", body = String, content_type = "text/plain")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let id = user_id(ApiOperation::Update, id)?;
    let users = state.users();

    if users
        .find_by_id(&id)
        .await
        .map_err(|e| persistence_failure(ApiOperation::Update, e))?
        .is_none()
    {
        return Err(ApiError::not_found(ApiOperation::Update, USER_NOT_FOUND));
    }

    let Json(payload) = payload.map_err(|e| body_rejected(ApiOperation::Update, e))?;

    let user = users
        .update(&id, payload)
        .await
        .map_err(|e| persistence_failure(ApiOperation::Update, e))?;

    tracing::info!(user_id = user.id, "User updated");
    Ok(Json(user))
}

/// Delete a user by ID
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "ID of the user to delete")),
    responses(
        (status = 200, description = "User deleted", body = String, content_type = "text/plain"),
        (status = 404, description = "User not found", body = String, content_type = "text/plain"),
        (
            status = 500,
            description = "Error deleting user",
            body = String,
            content_type = "text/plain"
        )
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<&'static str, ApiError> {
    let id = user_id(ApiOperation::Delete, id)?;
    let users = state.users();

    if users
        .find_by_id(&id)
        .await
        .map_err(|e| persistence_failure(ApiOperation::Delete, e))?
        .is_none()
    {
        return Err(ApiError::not_found(ApiOperation::Delete, USER_NOT_FOUND));
    }

    let removed = users
        .delete(&id)
        .await
        .map_err(|e| persistence_failure(ApiOperation::Delete, e))?;

    // Lost a race with a concurrent delete
    if !removed {
        return Err(ApiError::not_found(ApiOperation::Delete, USER_NOT_FOUND));
    }

    tracing::info!(user_id = id, "User deleted");
    Ok(USER_DELETED)
}

/// A path segment that is not an integer cannot name any stored user
fn user_id(
    operation: ApiOperation,
    id: Result<Path<i64>, PathRejection>,
) -> Result<i64, ApiError> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            tracing::debug!(%operation, error = %rejection, "Unparseable user id");
            Err(ApiError::not_found(operation, USER_NOT_FOUND))
        }
    }
}

fn body_rejected(operation: ApiOperation, rejection: JsonRejection) -> ApiError {
    tracing::warn!(%operation, error = %rejection, "Request body rejected");
    ApiError::bad_request(operation, failure_message(operation))
}

/// Map a repository failure to the response for `operation`
///
/// Writes (create, update) answer 400, reads and deletes answer 500, and a
/// record that vanished mid-request answers 404.
fn persistence_failure(operation: ApiOperation, err: RepositoryError) -> ApiError {
    if err.kind == RepositoryErrorKind::NotFound {
        tracing::debug!(
            %operation,
            entity_id = ?err.entity_id,
            "User disappeared during request"
        );
        return ApiError::not_found(operation, USER_NOT_FOUND);
    }

    tracing::error!(
        %operation,
        repository_operation = %err.operation,
        kind = %err.kind,
        entity_id = ?err.entity_id,
        retriable = err.is_retriable(),
        "Persistence error: {}", err.message
    );

    let message = failure_message(operation);
    match operation {
        ApiOperation::Create | ApiOperation::Update => ApiError::bad_request(operation, message),
        ApiOperation::List | ApiOperation::Get | ApiOperation::Delete => {
            ApiError::internal(operation, message)
        }
    }
}

fn failure_message(operation: ApiOperation) -> &'static str {
    match operation {
        ApiOperation::Create => CREATE_FAILED,
        ApiOperation::Update => UPDATE_FAILED,
        ApiOperation::Delete => DELETE_FAILED,
        ApiOperation::List | ApiOperation::Get => SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ApiErrorKind;
    use crate::repository::RepositoryOperation;

    #[test]
    fn test_persistence_failure_maps_writes_to_bad_request() {
        let err =
            RepositoryError::from_sqlx(RepositoryOperation::Create, sqlx::Error::PoolClosed);
        let api = persistence_failure(ApiOperation::Create, err);
        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(api.message, CREATE_FAILED);
        assert_eq!(api.kind, ApiErrorKind::BadRequest);

        let err =
            RepositoryError::from_sqlx(RepositoryOperation::FindById, sqlx::Error::PoolClosed);
        let api = persistence_failure(ApiOperation::Update, err);
        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(api.message, UPDATE_FAILED);
    }

    #[test]
    fn test_persistence_failure_maps_reads_and_deletes_to_server_error() {
        for (operation, message) in [
            (ApiOperation::List, SERVER_ERROR),
            (ApiOperation::Get, SERVER_ERROR),
            (ApiOperation::Delete, DELETE_FAILED),
        ] {
            let err = RepositoryError::from_sqlx(
                RepositoryOperation::FindAll,
                sqlx::Error::PoolTimedOut,
            );
            let api = persistence_failure(operation, err);
            assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(api.message, message);
        }
    }

    #[test]
    fn test_persistence_failure_keeps_not_found() {
        let err =
            RepositoryError::not_found("User", "9").with_operation(RepositoryOperation::Update);
        let api = persistence_failure(ApiOperation::Update, err);
        assert_eq!(api.kind, ApiErrorKind::NotFound);
        assert_eq!(api.message, USER_NOT_FOUND);
    }
}
