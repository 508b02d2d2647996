//! Quote endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};
use quotebook_common::AppResult;
use quotebook_core::{
    CreateQuoteInput, EditQuoteInput, PreparedQuote, QuoteSearchInput, validate,
};
use quotebook_db::entities::user::Role;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    params,
    response::{ApiResponse, ok},
};

/// Create quote router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_quotes))
        .route("/", post(create_quote))
        .route("/random", get(random_quote))
        .route("/{id}", get(get_quote))
        .route("/{id}", patch(edit_quote))
        .route("/{id}", delete(delete_quote))
        .route("/{id}/state", put(set_quote_state))
        .route("/{id}/reaction", put(react))
        .route("/{id}/reaction", delete(unreact))
}

/// Search query. Ids match exactly, text as a case-insensitive substring.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuotesQuery {
    pub originator: Option<String>,
    pub class: Option<String>,
    pub text: Option<String>,
    pub state: Option<String>,
}

/// List quotes the actor may view.
async fn search_quotes(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuotesQuery>,
) -> AppResult<ApiResponse<Vec<PreparedQuote>>> {
    let input = QuoteSearchInput {
        originator_id: params::id_or_undefined("originator", query.originator)?,
        class_id: params::id_or_undefined("class", query.class)?,
        text: query.text.filter(|text| !text.is_empty()),
        state: query
            .state
            .filter(|state| !state.is_empty())
            .map(|state| validate::quote_state(&state))
            .transpose()?,
    };

    let prepared = state.quote_service.search(user.as_ref(), input).await?;
    Ok(ApiResponse::ok(prepared))
}

/// A random quote from the anonymous-visible pool.
async fn random_quote(State(state): State<AppState>) -> AppResult<ApiResponse<PreparedQuote>> {
    let prepared = state.quote_service.random().await?;
    Ok(ApiResponse::ok(prepared))
}

/// Fetch one quote; invisible quotes read as absent.
async fn get_quote(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PreparedQuote>> {
    let id = params::id("id", Some(id))?;
    let prepared = state.quote_service.get(user.as_ref(), &id).await?;
    Ok(ApiResponse::ok(prepared))
}

/// Creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    pub text: Option<String>,
    pub context: Option<String>,
    pub note: Option<String>,
    pub originator: Option<String>,
    pub class: Option<String>,
}

/// Submit a quote.
///
/// Admin submissions answer 201; everyone else gets 202 — the quote may
/// still be pending moderation.
async fn create_quote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateQuoteRequest>,
) -> AppResult<(StatusCode, ApiResponse<PreparedQuote>)> {
    let input = CreateQuoteInput {
        text: params::string("text", req.text)?,
        context: req.context,
        note: req.note,
        originator_id: params::id("originator", req.originator)?,
        class_id: params::id_or_undefined("class", req.class)?,
    };

    let prepared = state.quote_service.create(&user, input).await?;

    let status = if user.role == Role::Admin {
        StatusCode::CREATED
    } else {
        StatusCode::ACCEPTED
    };

    Ok((status, ApiResponse::ok(prepared)))
}

/// Edit request. Absent fields stay untouched; an empty `context`, `note`,
/// or `class` unsets the field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditQuoteRequest {
    pub text: Option<String>,
    pub context: Option<String>,
    pub note: Option<String>,
    pub originator: Option<String>,
    pub class: Option<String>,
}

/// Edit a quote.
async fn edit_quote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EditQuoteRequest>,
) -> AppResult<ApiResponse<PreparedQuote>> {
    let id = params::id("id", Some(id))?;
    let input = EditQuoteInput {
        text: req.text,
        context: req.context,
        note: req.note,
        originator_id: req.originator.map(|o| params::id("originator", Some(o))).transpose()?,
        class_id: params::id_or_unset("class", req.class)?,
    };

    let prepared = state.quote_service.edit(&user, &id, input).await?;
    Ok(ApiResponse::ok(prepared))
}

/// State change request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStateRequest {
    pub state: Option<String>,
}

/// Transition a quote.
async fn set_quote_state(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetStateRequest>,
) -> AppResult<ApiResponse<PreparedQuote>> {
    let id = params::id("id", Some(id))?;
    let requested = validate::quote_state(&params::string("state", req.state)?)?;

    let prepared = state.quote_service.set_state(&user, &id, requested).await?;
    Ok(ApiResponse::ok(prepared))
}

/// Delete a quote.
async fn delete_quote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    let id = params::id("id", Some(id))?;
    state.quote_service.delete(&user, &id).await?;
    Ok(ok())
}

/// Reaction request. `like` must be an actual boolean.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactRequest {
    pub like: Option<Value>,
}

/// Record or flip a reaction.
async fn react(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReactRequest>,
) -> AppResult<ApiResponse<PreparedQuote>> {
    let id = params::id("id", Some(id))?;
    let like = params::boolean("like", req.like.as_ref())?;

    let prepared = state.quote_service.react(&user, &id, like).await?;
    Ok(ApiResponse::ok(prepared))
}

/// Remove the actor's reaction.
async fn unreact(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PreparedQuote>> {
    let id = params::id("id", Some(id))?;
    let prepared = state.quote_service.unreact(&user, &id).await?;
    Ok(ApiResponse::ok(prepared))
}
