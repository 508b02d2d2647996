//! Quotebook server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use quotebook_api::{AppState, router as api_router};
use quotebook_common::Config;
use quotebook_core::{AuthService, ClassService, PersonService, QuoteService, UserService};
use quotebook_db::repositories::{
    ClassRepository, PersonRepository, QuoteRepository, ReactionRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A .env file is a convenience for local runs; absent in production
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotebook=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting quotebook server...");

    // Load configuration
    let config = Config::load()?;

    if config.server.dev {
        info!("Development mode enabled; dev-only routes are live");
    }

    // Connect to database
    let db = quotebook_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    quotebook_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let class_repo = ClassRepository::new(Arc::clone(&db));
    let person_repo = PersonRepository::new(Arc::clone(&db));
    let quote_repo = QuoteRepository::new(Arc::clone(&db));
    let reaction_repo = ReactionRepository::new(Arc::clone(&db));

    // Initialize services
    let auth_service = AuthService::new(user_repo.clone(), class_repo.clone(), &config.auth);
    let quote_service = QuoteService::new(
        quote_repo,
        reaction_repo,
        person_repo.clone(),
        class_repo.clone(),
    );
    let user_service = UserService::new(user_repo, class_repo.clone(), config.server.dev);
    let class_service = ClassService::new(class_repo);
    let person_service = PersonService::new(person_repo);

    // Create app state
    let state = AppState {
        auth_service,
        quote_service,
        user_service,
        class_service,
        person_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            quotebook_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
