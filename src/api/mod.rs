//! REST API for Orbitmarks.
//!
//! All payloads are JSON. Authentication is a session cookie set by signup
//! and login; see [`auth::AuthenticatedUser`].

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app::App;

pub mod auth;
pub mod error;
pub mod handlers;

/// Builds the full router with shared state attached.
pub fn router(app: App) -> Router {
    let mut router = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::put_settings),
        )
        .route(
            "/api/bookmarks",
            get(handlers::list_bookmarks).post(handlers::create_bookmark),
        )
        .route("/api/bookmarks/layout", put(handlers::save_layout))
        .route(
            "/api/bookmarks/{id}",
            get(handlers::get_bookmark)
                .patch(handlers::update_bookmark)
                .delete(handlers::delete_bookmark),
        )
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = app.config.allowed_origin.as_deref() {
        match HeaderValue::from_str(origin) {
            Ok(value) => {
                router = router.layer(
                    CorsLayer::new()
                        .allow_origin(value)
                        .allow_credentials(true)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::PATCH,
                            Method::DELETE,
                        ])
                        .allow_headers([header::CONTENT_TYPE]),
                );
            }
            Err(e) => tracing::warn!(origin, error = %e, "ignoring unusable CORS origin"),
        }
    }

    router.with_state(app)
}

/// Serves the API on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(app: App, listener: TcpListener, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "HTTP listening");
    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown)
        .await
}
