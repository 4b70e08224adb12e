mod attachment;
mod config;
mod error;
mod handlers;
mod i18n;
mod session;
mod state;

use std::path::Path;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post}
};
use dvorfs_client::BackendClient;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use handlers::{actions, pages};
use i18n::Translations;
use state::AppState;

pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(pages::home_page))
        .route("/info", post(actions::fetch_info))
        .route("/format-type", post(actions::change_format_type))
        .route("/select", post(actions::select_format))
        .route("/download", post(actions::download))
        .route("/locale", post(actions::switch_locale))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dvorfs=info,dvorfs_client=info,tower_http=debug".into())
        )
        .init();

    let config = Config::from_env()?;

    let backend = BackendClient::new(&config.backend_url).with_download_url(&config.download_url);
    tracing::info!("Using backend at {}", backend.base_url());
    if backend.download_url() != backend.base_url() {
        tracing::info!("Using download backend at {}", backend.download_url());
    }

    let translations = Translations::load().context("embedded translations are malformed")?;
    let state = AppState::new(backend, translations);

    let sweeper = state.clone();
    let session_idle = config.session_idle;
    tokio::spawn(async move {
        sweeper.sweep_sessions(session_idle).await;
    });

    let app = router(state, &config.static_dir);

    let addr = config.listen_addr()?;
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
