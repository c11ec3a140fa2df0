//! Hot reload of notifier rules when the configuration file changes.

use crate::config::Config;
use crate::store::{lint_rules, NotifierStore};
use anyhow::Result;
use notify::{
    event::EventKind, Config as WatcherConfig, Event, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Watches the configuration file and swaps new notifier rules into a store.
pub struct ConfigWatcher {
    config_path: PathBuf,
    store: NotifierStore,
    reload_notifier: Option<mpsc::Sender<()>>,
}

impl ConfigWatcher {
    pub fn new(config_path: PathBuf, store: NotifierStore) -> Self {
        Self {
            config_path,
            store,
            reload_notifier: None,
        }
    }

    /// Sends `()` on `notifier` after every successful reload.
    pub fn with_reload_notifier(mut self, notifier: mpsc::Sender<()>) -> Self {
        self.reload_notifier = Some(notifier);
        self
    }

    /// Re-reads the configuration file and replaces the store's rules.
    ///
    /// On failure the previous rules stay in place.
    pub fn reload(&self) -> Result<usize> {
        let config = Config::load_file(&self.config_path)?;
        let count = config.notifiers.len();
        lint_rules(&config.notifiers);
        self.store.replace(config.notifiers);
        metrics::counter!("config_reloads").increment(1);
        Ok(count)
    }

    /// Starts watching in a background task until `shutdown_rx` fires.
    pub fn spawn(self, shutdown_rx: watch::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.run(shutdown_rx).await {
                error!("Config watcher error: {}", e);
            }
        })
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<()>) -> Result<()> {
        let (tx, mut rx) = mpsc::channel(100);

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    if let Err(e) = tx.blocking_send(event) {
                        error!("Failed to send file event: {}", e);
                    }
                }
            },
            WatcherConfig::default(),
        )?;

        // Editors often replace the file rather than write it in place, so
        // watch the parent directory.
        let parent = watch_dir(&self.config_path);
        watcher.watch(&parent, RecursiveMode::NonRecursive)?;
        info!(path = %self.config_path.display(), "Watching configuration file for changes");

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    info!("Config watcher received shutdown signal.");
                    break;
                }
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    if !self.should_reload(&event) {
                        continue;
                    }
                    info!("Configuration change detected, reloading notifiers...");
                    match self.reload() {
                        Ok(count) => {
                            info!("Successfully reloaded {} notifiers", count);
                            if let Some(notifier) = &self.reload_notifier {
                                if notifier.send(()).await.is_err() {
                                    warn!("Reload notifier channel closed");
                                }
                            }
                        }
                        Err(e) => {
                            error!(
                                error = %e,
                                "Failed to reload configuration, keeping previous notifiers"
                            );
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn should_reload(&self, event: &Event) -> bool {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) => event
                .paths
                .iter()
                .any(|path| same_file(path, &self.config_path)),
            _ => false,
        }
    }
}

fn watch_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Event paths are absolute while the configured path may be relative.
fn same_file(event_path: &Path, config_path: &Path) -> bool {
    if event_path == config_path {
        return true;
    }
    match (event_path.canonicalize(), config_path.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => event_path.file_name() == config_path.file_name() && event_path.ends_with(config_path),
    }
}
