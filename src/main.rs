use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};

use home_inventory as app;
use home_inventory::backend::{AuthBackend, BackendError, MemoryBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = app::config::load_config().context("loading configuration")?;
    app::config::init_tracing(&cfg.log_level, cfg.log_json);
    app::health::init_start_time();

    let backend = MemoryBackend::shared();
    if let Some((email, password)) = cfg.demo_user() {
        match backend.sign_up(email, password).await {
            Ok(user) => info!(uid = %user.uid, %email, "demo account ready"),
            Err(BackendError::EmailInUse) => {}
            Err(e) => warn!(error = %e, "could not create demo account"),
        }
    }

    // Init events
    let (event_sender, event_rx) = app::events::channel(cfg.event_channel_capacity);
    tokio::spawn(app::events::process_events(event_rx));

    let state = app::AppState::in_memory(cfg.clone(), backend, event_sender);
    tokio::spawn(app::stock::watch_critical_items(
        app::live::LiveList::spawn(state.items.subscribe()),
    ));

    let router = app::app(state);

    // Bind and serve
    let addr: SocketAddr = cfg
        .bind_address()
        .parse()
        .with_context(|| format!("invalid listen address {}", cfg.bind_address()))?;
    info!("home-inventory listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
