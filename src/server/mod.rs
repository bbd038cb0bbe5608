//! HTTP surface: generate, serve and mint pieces, render contract
//! templates, read notifications.

pub mod error;
mod handlers;

use crate::auth::AuthGate;
use crate::config::ZigzagConfig;
use crate::gallery::Gallery;
use crate::mint::MintService;
use crate::notify::NotificationBus;
use anyhow::Result;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;

/// Shared state behind every handler.
pub struct AppState {
    pub gallery: Gallery,
    pub minter: MintService,
    pub notifications: Arc<NotificationBus>,
    auth: Option<LoginGate>,
}

struct LoginGate {
    gate: AuthGate,
    header: String,
}

impl AppState {
    /// State with no login gate.
    pub fn new(gallery: Gallery, minter: MintService, notifications: Arc<NotificationBus>) -> Self {
        Self {
            gallery,
            minter,
            notifications,
            auth: None,
        }
    }

    /// Require `header` to carry a login that `gate` accepts.
    pub fn with_auth(mut self, gate: AuthGate, header: impl Into<String>) -> Self {
        self.auth = Some(LoginGate {
            gate,
            header: header.into(),
        });
        self
    }

    pub fn from_config(config: &ZigzagConfig, notifications: Arc<NotificationBus>) -> Self {
        let state = Self::new(
            Gallery::new(config.server.gallery_capacity),
            MintService::from_config(&config.chain),
            notifications,
        );
        if config.auth.enabled {
            let gate = AuthGate::new(config.auth.allowed_login.as_deref());
            state.with_auth(gate, config.auth.login_header.clone())
        } else {
            state
        }
    }
}

async fn require_login(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let Some(auth) = &state.auth else {
        return next.run(request).await;
    };
    let login = request
        .headers()
        .get(auth.header.as_str())
        .and_then(|value| value.to_str().ok());
    if auth.gate.authorize(login) {
        next.run(request).await
    } else {
        ApiError::Unauthorized("not authorized".to_string()).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/nft/generate", post(handlers::generate))
        .route("/api/nft/image/:id", get(handlers::image))
        .route("/api/nft/mint", post(handlers::mint))
        .route("/api/contract", post(handlers::contract))
        .route("/api/notifications", get(handlers::notifications))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_login));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` from the config and serve until ctrl-c.
pub async fn serve(config: &ZigzagConfig) -> Result<()> {
    let notifications = Arc::new(NotificationBus::new());
    let state = Arc::new(AppState::from_config(config, notifications));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
