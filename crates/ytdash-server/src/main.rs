mod api;
mod middleware;
mod session;

use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::EnvFilter;
use ytdash_youtube::YoutubeClient;

use crate::{
    api::{build_app, default_rate_limits, AppState},
    session::SessionStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(ytdash_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = ytdash_db::PoolConfig::from_app_config(&config);
    let pool = ytdash_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = ytdash_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations complete");

    let youtube = match config.youtube_api_key.as_deref() {
        Some(key) => Some(Arc::new(YoutubeClient::with_base_url(
            key,
            config.youtube_timeout_secs,
            &config.user_agent,
            &config.youtube_base_url,
        )?)),
        None => {
            tracing::error!("YOUTUBE_API_KEY is not set; fetch actions are disabled");
            None
        }
    };

    let sessions = SessionStore::new(config.session_ttl_secs);
    let state = AppState {
        pool,
        youtube,
        sessions,
        config: Arc::clone(&config),
    };
    let app = build_app(state, default_rate_limits());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "ytdash-server listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
