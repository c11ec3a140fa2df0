//! Reading newline-delimited result records and feeding them to the processor.

use crate::processor::{EntryProcessor, LogType, Outcome};
use anyhow::Result;
use futures::future::join_all;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Reads records from `reader` until EOF or shutdown.
///
/// Each non-blank line is delivered as a result record. Lines that are not
/// valid UTF-8 are logged and skipped. Returns the dispatch tasks that were
/// still running when reading stopped.
pub async fn feed_lines<R>(
    reader: R,
    processor: &EntryProcessor,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<Vec<JoinHandle<()>>>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).split(b'\n');
    let mut pending: Vec<JoinHandle<()>> = Vec::new();

    loop {
        let line = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => {
                info!("Input reader received shutdown signal.");
                break;
            }
            line = lines.next_segment() => line?,
        };

        let Some(line) = line else {
            debug!("Input reached end of stream.");
            break;
        };
        let line = match String::from_utf8(line) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Discarding log record that is not valid UTF-8");
                metrics::counter!("entries_skipped", "reason" => "malformed").increment(1);
                continue;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Outcome::Dispatched(handle) = processor.log_string(LogType::String, line) {
            pending.push(handle);
        }
        pending.retain(|handle| !handle.is_finished());
    }

    Ok(pending)
}

/// Waits up to `grace` for in-flight dispatch tasks, then gives up on them.
pub async fn drain(pending: Vec<JoinHandle<()>>, grace: Duration) {
    if pending.is_empty() {
        return;
    }
    let count = pending.len();
    info!("Waiting up to {:?} for {} in-flight alerts", grace, count);
    if tokio::time::timeout(grace, join_all(pending)).await.is_err() {
        warn!("{} alerts were still being presented at shutdown", count);
    }
}
