//! HTTP API layer for quotebook.
//!
//! This crate is thin glue: the auth middleware resolves the actor, the
//! `params` helpers turn raw payload fields into validated typed values,
//! and the endpoint handlers dispatch into `quotebook-core`. Everything
//! interesting (permissions, the quote state machine) lives below.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod params;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
