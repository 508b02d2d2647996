//! API middleware.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use quotebook_common::AppError;
use quotebook_core::{AuthService, ClassService, PersonService, QuoteService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub quote_service: QuoteService,
    pub user_service: UserService,
    pub class_service: ClassService,
    pub person_service: PersonService,
}

/// Authentication middleware.
///
/// No `Authorization` header means an anonymous request and the handler
/// decides what that actor may see. A header that is present but does not
/// resolve to an account is an authentication failure — it never degrades
/// to anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return next.run(req).await;
    };

    let Ok(value) = value.to_str() else {
        return AppError::Unauthorized.into_response();
    };

    match state.auth_service.resolve_bearer(value).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
