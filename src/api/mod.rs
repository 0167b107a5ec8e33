pub mod auth;
pub mod bookmarks;
pub mod error;
pub mod token;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    // Bookmark routes; each handler authenticates via the CurrentUser
    // extractor, so there is no separate auth middleware to bypass
    let bookmark_routes = Router::new()
        .route(
            "/bookmarks",
            get(bookmarks::list_bookmarks).post(bookmarks::create_bookmark),
        )
        .route("/bookmarks/:id", delete(bookmarks::delete_bookmark));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api", bookmark_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::Config;
    use crate::{db, AppState};
    use std::sync::Arc;

    pub const TEST_SECRET: &str = "test-signing-secret";

    /// State over an in-memory database. The summarizer base points at a
    /// closed port so nothing reaches out unless a test overrides it.
    pub async fn test_state() -> Arc<AppState> {
        test_state_with_summarizer("http://127.0.0.1:1").await
    }

    pub async fn test_state_with_summarizer(summarizer_url: &str) -> Arc<AppState> {
        let mut config = Config::default();
        config.auth.token_secret = TEST_SECRET.to_string();
        config.enrichment.summarizer_url = summarizer_url.to_string();
        config.enrichment.fetch_timeout_secs = 5;

        let pool = db::test_pool().await;
        Arc::new(AppState::new(config, pool).expect("test state"))
    }
}
