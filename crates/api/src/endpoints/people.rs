//! Person endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use quotebook_common::AppResult;
use quotebook_core::{PreparedPerson, validate};
use serde::Deserialize;

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    params,
    response::ApiResponse,
};

/// Create person router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_people))
        .route("/", post(create_person))
        .route("/{id}", get(get_person))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPeopleQuery {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub person_type: Option<String>,
}

/// List people, optionally filtered by name and type substrings.
async fn search_people(
    State(state): State<AppState>,
    Query(query): Query<SearchPeopleQuery>,
) -> AppResult<ApiResponse<Vec<PreparedPerson>>> {
    let name = query.name.filter(|name| !name.is_empty());
    let person_type = query.person_type.filter(|t| !t.is_empty());
    let prepared = state
        .person_service
        .search(name.as_deref(), person_type.as_deref())
        .await?;
    Ok(ApiResponse::ok(prepared))
}

/// Fetch one person.
async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PreparedPerson>> {
    let id = params::id("id", Some(id))?;
    let prepared = state.person_service.get(&id).await?;
    Ok(ApiResponse::ok(prepared))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub person_type: Option<String>,
}

/// Register a new person. Admin only.
async fn create_person(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePersonRequest>,
) -> AppResult<(StatusCode, ApiResponse<PreparedPerson>)> {
    let name = params::string("name", req.name)?;
    let person_type = validate::person_type(&params::string("type", req.person_type)?)?;
    let prepared = state
        .person_service
        .create(user.as_ref(), name, person_type)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(prepared)))
}
