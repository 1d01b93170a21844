use crate::db::connection::DbPool;
use crate::views::{detail, handler_404, health, index, results, vote};
use axum::{
    Router,
    extract::Extension,
    http::{
        Method,
        header::{ACCEPT, CONTENT_TYPE},
    },
    routing::{get, post},
};
use tokio::time::{Duration, interval};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{
    Expiry, MemoryStore, SessionManagerLayer,
    cookie::{SameSite, time::Duration as CookieDuration},
};
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
}

impl AppState {
    pub fn new(db: DbPool) -> Self {
        AppState { db }
    }
}

/// Checks out a connection every minute and logs when the store is unreachable.
pub fn spawn_health_probe(db: DbPool) {
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            match db.acquire().await {
                Ok(conn) => {
                    drop(conn);
                }
                Err(e) => {
                    error!("Database connection health check failed: {}", e);
                }
            }
        }
    });
}

pub fn router(app_state: AppState, session_secure: bool) -> Router {
    let session_store = MemoryStore::default();

    Router::new()
        .route("/polls/", get(index))
        .route("/polls/:question_id/", get(detail))
        .route("/polls/:question_id/results/", get(results))
        .route("/polls/:question_id/vote/", post(vote))
        .route("/health", get(health))
        .fallback(handler_404)
        .layer(Extension(app_state))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE, ACCEPT]),
        )
        .layer(
            SessionManagerLayer::new(session_store)
                .with_name("polls_session")
                .with_same_site(SameSite::Lax)
                .with_secure(session_secure)
                .with_expiry(Expiry::OnInactivity(CookieDuration::weeks(2))),
        )
        .layer(TraceLayer::new_for_http())
}
