//! DocuChat Gateway: edge gate, server actions and chat view over HTTP.
//! Sits between the browser and the Document QA API (or its mock).

use axum::{
    extract::{ConnectInfo, DefaultBodyLimit, Request},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use docuchat_core::{build_api, Actions, ChatViewCache, DocumentApi, GatewayConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod gate;
mod handlers;
mod session;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub actions: Arc<Actions>,
}

impl AppState {
    pub fn new(config: GatewayConfig, api: Arc<dyn DocumentApi>) -> Self {
        let cache = ChatViewCache::with_limits(config.chat_cache_ttl(), config.chat_cache_capacity);
        Self {
            config: Arc::new(config),
            actions: Arc::new(Actions::with_cache(api, cache)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[docuchat-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::load().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;
    let api = build_api(&config);
    tracing::info!(
        environment = %config.environment,
        mode = ?api.mode(),
        "DocuChat gateway {} starting",
        docuchat_core::version()
    );
    let state = AppState::new(config, api);
    let addr = state.config.bind_address();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("DocuChat gateway listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

fn build_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Credentialed CORS: origins, methods and headers must be explicit.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::root))
        .route("/login", get(handlers::login_page))
        .route("/signup", get(handlers::signup_page))
        .route("/chat", get(handlers::chat_page))
        .route("/chat/*rest", get(handlers::chat_page))
        .route("/api/login", post(handlers::login))
        .route("/api/signup", post(handlers::signup))
        .route("/api/logout", post(handlers::logout))
        .route("/api/history", get(handlers::history))
        .route("/api/upload", post(handlers::upload).layer(upload_limit))
        .route("/api/ask", post(handlers::ask))
        .layer(middleware::from_fn_with_state(state.clone(), gate::edge_gate))
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let response = next.run(request).await;
    tracing::info!(
        %method,
        %path,
        client = ?client,
        status = response.status().as_u16(),
        "Request handled"
    );
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Shutdown initiated (Ctrl+C received)"),
        _ = terminate => tracing::info!("Shutdown initiated (SIGTERM received)"),
    }
}
