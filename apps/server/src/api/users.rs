use std::sync::Arc;

use amanah_core::users::{NewUser, Role, User, UserUpdate};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    auth::{hash_password, CurrentUser, OWNER_ONLY},
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    email: String,
    name: String,
    role: Role,
    password: String,
}

#[derive(Deserialize)]
struct PasswordRequest {
    password: String,
}

fn hashed(password: &str) -> ApiResult<String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    hash_password(password).map_err(|e| ApiError::Internal(format!("{:?}", e)))
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<User>>> {
    current.require(OWNER_ONLY)?;
    Ok(Json(state.user_service.list_users()?))
}

async fn get_user(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<User>> {
    current.require(OWNER_ONLY)?;
    Ok(Json(state.user_service.get_user(&id)?))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let actor = current.require(OWNER_ONLY)?;
    let password_hash = hashed(&body.password)?;
    let user = state
        .user_service
        .create_user(
            actor,
            NewUser {
                email: body.email,
                name: body.name,
                role: body.role,
                password_hash,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(update): Json<UserUpdate>,
) -> ApiResult<Json<User>> {
    let actor = current.require(OWNER_ONLY)?;
    let user = state.user_service.update_user(actor, &id, update).await?;
    Ok(Json(user))
}

/// Users may change their own password; the owner may change anyone's.
async fn change_password(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(body): Json<PasswordRequest>,
) -> ApiResult<StatusCode> {
    let password_hash = hashed(&body.password)?;
    state
        .user_service
        .change_password(current.actor(), &id, password_hash)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn deactivate_user(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<User>> {
    let actor = current.require(OWNER_ONLY)?;
    let user = state.user_service.deactivate_user(actor, &id).await?;
    Ok(Json(user))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(deactivate_user),
        )
        .route("/users/{id}/password", put(change_password))
}
