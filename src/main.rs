mod config;
mod db;
mod llm;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match config::ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid server configuration");
            return ExitCode::FAILURE;
        }
    };

    let pool = match db::init_pool(&config.database_url, config.db_max_connections).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "database init failed");
            return ExitCode::FAILURE;
        }
    };

    if config.seed_content {
        if let Err(e) = db::seed::seed_content(&pool).await {
            tracing::error!(error = %e, "content seeding failed");
            return ExitCode::FAILURE;
        }
    }

    // Non-fatal: meal analysis answers 500 until the LLM is configured.
    let llm: Option<Arc<dyn llm::LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; meal analysis disabled");
            None
        }
    };

    let mailer = services::mailer::Mailer::from_lookup(|key| std::env::var(key).ok(), &config.public_base_url);
    if mailer.is_none() {
        tracing::warn!("RESEND_API_KEY / RESEND_FROM not set; account codes will only be logged");
    }

    let rate_limits = rate_limit::RateLimitConfig::from_env();
    let port = config.port;
    let state = state::AppState::new(pool, config, llm, mailer, rate_limits);
    let limits = state.rate_limiter.config();
    tracing::info!(
        per_user = limits.per_user_limit,
        global = limits.global_limit,
        window_secs = limits.window.as_secs(),
        "meal analysis rate limits"
    );
    let app = routes::app(state);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%port, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%port, "thyroidcloud listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
