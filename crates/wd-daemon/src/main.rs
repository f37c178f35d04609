// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! wardend — the warden process supervisor's daemon binary.
//!
//! Binds the JSON HTTP control plane to a TCP listener, searching
//! upward through adjacent ports on `EADDRINUSE`. On SIGINT/SIGTERM,
//! tree-terminates every live child before exiting.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::sync::Arc;
use std::time::Instant;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wd_daemon::env;
use wd_daemon::state::AppState;
use wd_shell::ShellLauncher;
use wd_store::TaskStore;
use wd_supervisor::{Guardian, ProcessRegistry, Supervisor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_dir = env::state_dir();
    std::fs::create_dir_all(&base_dir)?;

    let log_path = env::log_path();
    rotate_log_if_needed(&log_path);
    let _log_guard = setup_logging(&log_path)?;

    info!(base_dir = %base_dir.display(), "starting wardend");

    let store = Arc::new(TaskStore::open(&base_dir)?);
    let registry = Arc::new(ProcessRegistry::new());
    let launcher = ShellLauncher::new(!env::noninteractive_shell());
    let clock: Arc<dyn wd_core::Clock> = Arc::new(wd_core::SystemClock);

    let supervisor = Arc::new(Supervisor::new(
        store.clone(),
        registry,
        launcher,
        clock.clone(),
        base_dir.clone(),
    ));
    let guardian = Arc::new(Guardian::new(supervisor.clone(), clock));

    let state = AppState {
        store,
        supervisor: supervisor.clone(),
        guardian: guardian.clone(),
        start_time: Instant::now(),
    };

    tokio::spawn(guardian.run(env::guardian_tick()));

    let app = wd_daemon::routes::build(state);
    let listener = bind_with_fallback(env::preferred_port(), env::PORT_SEARCH_WIDTH).await?;
    info!(addr = %listener.local_addr()?, "wardend listening");

    #[cfg(unix)]
    let sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    #[cfg(unix)]
    let shutdown = shutdown_signal(supervisor, sigterm);
    #[cfg(not(unix))]
    let shutdown = shutdown_signal(supervisor);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("wardend stopped");
    Ok(())
}

/// Bind `preferred`, falling back to up to `width` adjacent ports above
/// it on `EADDRINUSE`.
async fn bind_with_fallback(preferred: u16, width: u16) -> std::io::Result<TcpListener> {
    let mut last_err = None;
    for offset in 0..=width {
        let port = preferred.saturating_add(offset);
        match TcpListener::bind(("0.0.0.0", port)).await {
            Ok(listener) => {
                if offset > 0 {
                    warn!(preferred, bound = port, "preferred port in use, bound adjacent port");
                }
                return Ok(listener);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| std::io::Error::other("no port available")))
}

/// Wait for SIGINT/SIGTERM, then tree-terminate every live entry before
/// letting axum's graceful shutdown proceed. The SIGTERM stream is built
/// by the caller (fallibly, with `?`) since installing it can fail and
/// this function's signature leaves no room to propagate that.
#[cfg(unix)]
async fn shutdown_signal(supervisor: Arc<Supervisor>, mut sigterm: tokio::signal::unix::Signal) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
    }

    supervisor.shutdown_all().await;
}

#[cfg(not(unix))]
async fn shutdown_signal(supervisor: Arc<Supervisor>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("received SIGINT, shutting down");
    supervisor.shutdown_all().await;
}

/// Maximum log file size before rotation (10 MiB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated log files to keep (`wardend.log.1`, `.2`, `.3`).
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`], shifting
/// `wardend.log` → `.1` → `.2` → `.3`, deleting the oldest. Best-effort:
/// rotation failures never block startup.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

/// Logs to both stdout and the rotating file under the state directory,
/// returning the non-blocking writer's guard — the caller must keep it
/// alive for the process lifetime or buffered lines are dropped on exit.
fn setup_logging(
    log_path: &std::path::Path,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    let dir = log_path.parent().unwrap_or_else(|| std::path::Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = log_path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "log path has no file name")
    })?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}
