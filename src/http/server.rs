//! HTTP server exposing one explorer session

use super::handler::{
    advance_handler, image_get_handler, image_handler, query_handler, reset_handler,
    session_handler, start_handler, status_handler, tenant_handler, tenants_handler,
    SharedSession,
};
use crate::session::Session;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Build the API router around a shared session
pub fn router(session: SharedSession) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/tenants", get(tenants_handler))
        .route("/api/session", get(session_handler))
        .route("/api/session/tenant", put(tenant_handler))
        .route("/api/session/query", put(query_handler))
        .route("/api/playback/start", post(start_handler))
        .route("/api/playback/advance", post(advance_handler))
        .route("/api/playback/reset", post(reset_handler))
        .route("/api/image", get(image_get_handler).post(image_handler))
        .layer(CorsLayer::permissive())
        .with_state(session)
}

/// HTTP server managing the session API
pub struct HttpServer {
    session: SharedSession,
    bind: String,
    port: u16,
}

impl HttpServer {
    pub fn new(session: Session, bind: impl Into<String>, port: u16) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            bind: bind.into(),
            port,
        }
    }

    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    /// Start the HTTP server
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = router(self.session());

        let addr = format!("{}:{}", self.bind, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("Explorer API available at http://{}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
