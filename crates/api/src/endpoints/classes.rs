//! Class endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use quotebook_common::AppResult;
use quotebook_core::PreparedClass;
use serde::Deserialize;

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    params,
    response::ApiResponse,
};

/// Create class router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_classes))
        .route("/", post(create_class))
        .route("/{id}", get(get_class))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchClassesQuery {
    pub name: Option<String>,
}

/// List classes, optionally filtered by name substring.
async fn search_classes(
    State(state): State<AppState>,
    Query(query): Query<SearchClassesQuery>,
) -> AppResult<ApiResponse<Vec<PreparedClass>>> {
    let name = query.name.filter(|name| !name.is_empty());
    let prepared = state.class_service.search(name.as_deref()).await?;
    Ok(ApiResponse::ok(prepared))
}

/// Fetch one class.
async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PreparedClass>> {
    let id = params::id("id", Some(id))?;
    let prepared = state.class_service.get(&id).await?;
    Ok(ApiResponse::ok(prepared))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    pub name: Option<String>,
}

/// Register a new class. Admin only.
async fn create_class(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateClassRequest>,
) -> AppResult<(StatusCode, ApiResponse<PreparedClass>)> {
    let name = params::string("name", req.name)?;
    let prepared = state.class_service.create(user.as_ref(), name).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(prepared)))
}
