//! hf-relay entrypoint.
//!
//! `hf-relay` serves the Telegram webhook; `hf-relay --polling` long-polls instead (local
//! development); `hf-relay --health-check` probes a running server and exits 0 or 1.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use relay::cache::QueryCacheHandle;
use relay::config::Config;
use relay::gateway::{HandlerState, create_router_with_state};
use relay::inference::HfRouterClient;
use relay::relay::Relay;
use relay::telegram::{BotClient, PollingOptions, run_polling};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }
    let polling = std::env::args().any(|arg| arg == "--polling");

    match dotenvy::dotenv() {
        Ok(path) => eprintln!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e.into()),
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        model = %config.model,
        cache_capacity = config.cache_capacity,
        mode = if polling { "polling" } else { "webhook" },
        "hf-relay starting"
    );

    let cache = QueryCacheHandle::with_capacity(config.cache_capacity);
    let transport = HfRouterClient::from_config(&config)?;
    let relay = Arc::new(Relay::new(cache, transport, config.model.clone()));

    // validate() guarantees the token is present.
    let telegram_token = config.telegram_token.as_deref().unwrap_or_default();
    let bot = BotClient::with_api_url(&config.telegram_api_url, telegram_token)?;

    if polling {
        let options = PollingOptions {
            prompt_limit: config.polling_prompt_limit,
            ..PollingOptions::default()
        };
        run_polling(&relay, &bot, options, shutdown_signal()).await;
    } else {
        let addr: SocketAddr = config.socket_addr().parse()?;
        let state = HandlerState::new(relay, Arc::new(bot), config.webhook_prompt_limit);
        let app = create_router_with_state(state);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %addr, "Server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    }

    tracing::info!("hf-relay shutdown complete");
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = std::env::var(Config::ENV_PORT)
        .or_else(|_| std::env::var(Config::ENV_PLATFORM_PORT))
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/health", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
