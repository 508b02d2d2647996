//! Registration and login endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use quotebook_common::AppResult;
use quotebook_core::{LoginInput, RegisterInput};
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, params, response::ApiResponse};

/// Create auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Registration request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub class: Option<String>,
}

/// Token response, shared by register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
}

/// Register a new guest account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, ApiResponse<TokenResponse>)> {
    let input = RegisterInput {
        username: params::string("username", req.username)?,
        email: params::string("email", req.email)?,
        password: params::string("password", req.password)?,
        class_id: params::id_or_undefined("class", req.class)?,
    };

    let (_, token) = state.auth_service.register(input).await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(TokenResponse { token })))
}

/// Login request. Either email or username identifies the account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Sign in to an existing account.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let input = LoginInput {
        email: req.email,
        username: req.username,
        password: params::string("password", req.password)?,
    };

    let (_, token) = state.auth_service.login(input).await?;

    Ok(ApiResponse::ok(TokenResponse { token }))
}
