//! User account endpoints: self profile, guest approval, dev-only removal.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, patch, post},
};
use quotebook_common::AppResult;
use quotebook_core::{PreparedUser, SelfEditInput};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    params,
    response::{ApiResponse, ok},
};

/// Create user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/me", patch(edit_me))
        .route("/guests", get(list_guests))
        .route("/{id}/approval", post(review_guest))
        .route("/{id}", delete(remove_user))
}

/// The authenticated actor's own account.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<PreparedUser>> {
    let prepared = state.user_service.me(&user).await?;
    Ok(ApiResponse::ok(prepared))
}

/// Self-edit request. `class: ""` detaches the account from its class.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMeRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub class: Option<String>,
}

/// Edit the actor's own account.
async fn edit_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<EditMeRequest>,
) -> AppResult<ApiResponse<PreparedUser>> {
    let input = SelfEditInput {
        username: req.username,
        email: req.email,
        password: req.password,
        class_id: params::id_or_unset("class", req.class)?,
    };

    let prepared = state.user_service.self_edit(&user, input).await?;
    Ok(ApiResponse::ok(prepared))
}

/// List guests awaiting approval.
async fn list_guests(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<PreparedUser>>> {
    let prepared = state.user_service.guests(user.as_ref()).await?;
    Ok(ApiResponse::ok(prepared))
}

/// Approval request. `allow` must be an actual boolean.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewGuestRequest {
    pub allow: Option<Value>,
}

/// Promote or decline a guest.
async fn review_guest(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReviewGuestRequest>,
) -> AppResult<ApiResponse<PreparedUser>> {
    let id = params::id("id", Some(id))?;
    let allow = params::boolean("allow", req.allow.as_ref())?;

    let prepared = state.user_service.review_guest(user.as_ref(), &id, allow).await?;
    Ok(ApiResponse::ok(prepared))
}

/// Hard-delete a user. Only exists in dev mode; outside it the service
/// answers 404 before looking at anything else, the id included.
async fn remove_user(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.user_service.remove(user.as_ref(), &id).await?;
    Ok(ok())
}
