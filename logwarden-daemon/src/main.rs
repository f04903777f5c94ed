//! Logwarden daemon entry point.
//!
//! Startup order matters here: configuration is resolved before logging
//! so the subscriber honors overrides, and the PID file is written last
//! so a failed bootstrap never leaves a stale lock behind.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use logwarden_core::LogwardenConfig;
use logwarden_core::monitor::MonitorSnapshot;
use logwarden_tail::{EchoHandler, EngineConfig, KeywordHandler, TailEngineBuilder};

use logwarden_daemon::cli::DaemonCli;
use logwarden_daemon::logging::init_tracing;
use logwarden_daemon::metrics_server::install_metrics_recorder;
use logwarden_daemon::pidfile::{remove_pid_file, write_pid_file};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    let mut config = LogwardenConfig::load(&cli.config)
        .await
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    // CLI flags take precedence over config file and environment
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format = format.clone();
    }
    if let Some(pid_file) = &cli.pid_file {
        config.general.pid_file = pid_file.clone();
    }
    if let Some(monitor) = &cli.monitor {
        config.monitor.config_path = monitor.display().to_string();
    }
    config.validate().context("invalid configuration")?;

    if cli.validate {
        // Also resolve the monitor YAML, including target file checks
        let snapshot = MonitorSnapshot::load(&config.monitor.config_path)
            .await
            .with_context(|| {
                format!("monitor config {} is invalid", config.monitor.config_path)
            })?;
        println!(
            "configuration OK: {} target(s), {} keyword(s)",
            snapshot.target_files.len(),
            snapshot.keywords.len()
        );
        return Ok(());
    }

    init_tracing(&config.general)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        monitor = %config.monitor.config_path,
        "logwarden-daemon starting"
    );

    if config.metrics.enabled {
        install_metrics_recorder(&config.metrics)?;
    }

    let pid_path = (!config.general.pid_file.is_empty())
        .then(|| config.general.pid_file.clone());
    if let Some(path) = &pid_path {
        write_pid_file(Path::new(path))?;
    }

    let engine = TailEngineBuilder::new()
        .config(EngineConfig::from_core(&config.monitor))
        .handler(Box::new(EchoHandler))
        .handler(Box::new(KeywordHandler::new()))
        .build();

    let shutdown = CancellationToken::new();
    let engine_task = tokio::spawn(engine.run(shutdown.clone()));

    let result = run_until_shutdown(engine_task, shutdown).await;

    if let Some(path) = &pid_path {
        remove_pid_file(Path::new(path));
    }

    result
}

/// Wait for either a termination signal or an unexpected engine exit.
async fn run_until_shutdown(
    mut engine_task: tokio::task::JoinHandle<Result<(), logwarden_tail::TailError>>,
    shutdown: CancellationToken,
) -> Result<()> {
    tokio::select! {
        signal = wait_for_shutdown_signal() => {
            let signal = signal?;
            tracing::info!(signal, "shutdown signal received");
            shutdown.cancel();
            engine_task
                .await
                .context("engine task panicked")?
                .context("engine failed during shutdown")?;
            tracing::info!("logwarden-daemon shut down");
            Ok(())
        }
        joined = &mut engine_task => {
            // The engine only returns on its own when bootstrap or the
            // watch backend failed; treat it as a daemon failure.
            match joined.context("engine task panicked")? {
                Ok(()) => Err(anyhow::anyhow!("engine stopped unexpectedly")),
                Err(e) => Err(anyhow::Error::new(e).context("engine failed")),
            }
        }
    }
}

/// Wait for SIGTERM or SIGINT (Ctrl+C).
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
