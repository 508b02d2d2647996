//! API endpoints.

mod auth;
mod classes;
mod people;
mod quotes;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/quotes", quotes::router())
        .nest("/classes", classes::router())
        .nest("/people", people::router())
}
