//! Registration and login handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::{ApiError, AppState, RequireAuth};
use solvehub_core::{
    hash_password, verify_password, CreateUserRequest, NewUser, UserProfile, UserRepository,
};

/// Response for register and login: the bearer token plus the account.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Register a new account and log it in.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let password_hash = hash_password(&req.password)?;

    let user = state
        .db
        .users
        .insert(NewUser {
            username: req.username.trim().to_string(),
            email: req.email.trim().to_string(),
            password_hash,
            display_name: req.display_name,
        })
        .await?;

    let token = state.signer.sign(user.id, state.config.token_ttl)?;
    tracing::info!(subsystem = "api", user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.profile(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub login: String,
    pub password: String,
}

/// Log in with username or email.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .db
        .users
        .fetch_by_login(req.login.trim())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }
    if !user.is_active {
        return Err(ApiError::Unauthorized("Account is deactivated".to_string()));
    }

    let token = state.signer.sign(user.id, state.config.token_ttl)?;
    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}

/// The authenticated account.
pub async fn me(auth: RequireAuth) -> Json<UserProfile> {
    Json(auth.user.profile())
}
