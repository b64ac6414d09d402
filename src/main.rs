use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod dto;
mod error;
mod handlers;
mod models;
mod rate_limit;
mod services;
mod store;

use config::Config;
use rate_limit::RateLimitState;
use services::assistant::{Assistant, ClaudeClient, TextCompletion};
use services::motivator::Motivator;
use store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
    pub assistant: Assistant,
    pub motivator: Motivator,
    pub ws_tx: Option<broadcast::Sender<String>>,
    pub rate_limiter: RateLimitState,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        completion: Arc<dyn TextCompletion>,
        ws_tx: Option<broadcast::Sender<String>>,
    ) -> Self {
        let assistant = Assistant::new(completion);
        Self {
            store: Store::bootstrap(config.seed_demo_data, handlers::today()),
            motivator: Motivator::new(assistant.clone(), ws_tx.clone()),
            rate_limiter: RateLimitState::new(
                config.assistant_rate_limit,
                config.assistant_rate_window_secs,
            ),
            assistant,
            config,
            ws_tx,
        }
    }
}

pub fn router(state: AppState) -> Router {
    // Assistant routes call the hosted model; limit them per client IP
    let assistant_routes = Router::new()
        .route("/api/assistant/ask", post(handlers::assistant::ask))
        .route(
            "/api/assistant/schedule-chat",
            get(handlers::assistant::get_schedule_chat).post(handlers::assistant::post_schedule_chat),
        )
        .route("/api/assistant/summary", post(handlers::assistant::summary))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_assistant,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/ws", get(handlers::ws::ws_handler))
        .route("/api/me", get(handlers::profile::me))
        // Medications
        .route(
            "/api/medications",
            get(handlers::medications::list_medications).post(handlers::medications::create_medication),
        )
        .route(
            "/api/medications/:id",
            get(handlers::medications::get_medication)
                .put(handlers::medications::update_medication)
                .delete(handlers::medications::delete_medication),
        )
        // Reminders
        .route(
            "/api/reminders",
            get(handlers::reminders::list_reminders).post(handlers::reminders::create_reminder),
        )
        .route(
            "/api/reminders/upcoming",
            get(handlers::reminders::upcoming_reminders),
        )
        .route(
            "/api/reminders/:id",
            put(handlers::reminders::update_reminder).delete(handlers::reminders::delete_reminder),
        )
        // Daily logs
        .route("/api/daily-logs/:date", get(handlers::daily_logs::get_daily_log))
        .route(
            "/api/daily-logs/:date/doses/:reminder_id",
            put(handlers::daily_logs::set_dose_status),
        )
        .route(
            "/api/daily-logs/:date/slots/:slot/toggle",
            post(handlers::daily_logs::toggle_slot),
        )
        .route("/api/daily-logs/:date/mood", put(handlers::daily_logs::set_mood))
        .route("/api/mood", get(handlers::daily_logs::list_moods))
        // Weekly view & motivation
        .route("/api/week", get(handlers::weekly::get_week))
        .route("/api/motivation", get(handlers::assistant::get_motivation))
        .merge(assistant_routes)
        .with_state(state)
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = vec![config
        .frontend_url
        .parse::<axum::http::HeaderValue>()
        .context("FRONTEND_URL is not a valid origin")?];
    // In dev, also allow LAN access (e.g. testing from another device)
    if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
        for o in extra.split(',') {
            if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                origins.push(hv);
            }
        }
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT]))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pillpal_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    if config.claude_api_key.is_empty() {
        tracing::warn!("CLAUDE_API_KEY not set; assistant replies will use fallback text");
    }
    let completion = Arc::new(ClaudeClient::from_config(&config)?);

    // WebSocket broadcast channel
    let (ws_tx, _) = broadcast::channel::<String>(256);

    let state = AppState::new(config.clone(), completion, Some(ws_tx));
    rate_limit::spawn_cleanup_worker(state.rate_limiter.clone());

    let app = router(state)
        .layer(cors_layer(&config)?)
        .layer(TraceLayer::new_for_http());

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    // Client IP is needed for rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
