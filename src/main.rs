//! logalert - Desktop alerts for endpoint monitoring results
//!
//! Reads result log records from stdin (or a file), matches them against the
//! configured notifier rules and shows the resulting alerts.

use anyhow::{Context, Result};
use clap::Parser;
use logalert::{
    build_processor,
    cli::Cli,
    config::Config,
    config_watch::ConfigWatcher,
    input::{drain, feed_lines},
    presentation,
    store::{lint_rules, NotifierStore},
};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        tracing_subscriber::fmt().with_writer(std::io::stderr).init();
        error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });

    // Initialize logging. Alerts may go to stdout, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config_path();
    info!("logalert starting up...");
    info!("-------------------- Configuration --------------------");
    info!("Config File: {}", config_path.display());
    info!("Log Level: {}", config.log_level);
    info!("Verbose: {}", config.verbose);
    info!("Presenter: {}", config.presenter);
    info!("Watch Config: {}", config.watch_config);
    match &config.input {
        Some(path) => info!("Input: {}", path.display()),
        None => info!("Input: stdin"),
    }
    info!("Notifiers: {}", config.notifiers.len());
    info!("-------------------------------------------------------");

    if !config_path.exists() {
        warn!(
            "Configuration file {} does not exist; no alerts will fire until it is created",
            config_path.display()
        );
    }
    lint_rules(&config.notifiers);

    let (shutdown_tx, shutdown_rx) = watch::channel(());

    let store = NotifierStore::new(config.notifiers.clone());
    let watcher_task = if config.watch_config {
        Some(ConfigWatcher::new(config_path, store.clone()).spawn(shutdown_rx.clone()))
    } else {
        None
    };

    let processor = build_processor(store, presentation::from_kind(config.presenter))
        .with_verbose(config.verbose);

    let mut reader = {
        let shutdown_rx = shutdown_rx.clone();
        let input = config.input.clone();
        tokio::spawn(async move {
            match input {
                Some(path) => {
                    let file = tokio::fs::File::open(&path)
                        .await
                        .with_context(|| format!("Failed to open input file {}", path.display()))?;
                    feed_lines(file, &processor, shutdown_rx).await
                }
                None => feed_lines(tokio::io::stdin(), &processor, shutdown_rx).await,
            }
        })
    };

    info!("logalert initialized successfully. Waiting for log records...");

    let (read_result, interrupted) = tokio::select! {
        result = &mut reader => {
            info!("Input closed. Shutting down...");
            (result, false)
        }
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutdown signal received. Shutting down gracefully...");
            // Receivers may already be gone if every task finished.
            let _ = shutdown_tx.send(());
            (reader.await, true)
        }
    };
    let _ = shutdown_tx.send(());

    let pending = match read_result {
        Ok(Ok(pending)) => pending,
        Ok(Err(e)) => {
            error!("Input reader failed: {:#}", e);
            Vec::new()
        }
        Err(e) => {
            error!("Input reader task panicked: {:?}", e);
            Vec::new()
        }
    };
    drain(pending, Duration::from_millis(config.shutdown_grace_ms)).await;

    if let Some(handle) = watcher_task {
        if let Err(e) = handle.await {
            error!("Config watcher task panicked: {:?}", e);
        }
    }

    info!("All tasks shut down. Exiting.");

    // A pending stdin read sits on a blocking thread the runtime would wait on.
    if interrupted {
        std::process::exit(0);
    }
    Ok(())
}
