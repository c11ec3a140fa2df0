//! A presenter that prints alerts to stdout.
//!
//! Useful on headless hosts and when piping alerts into other tools. Dialogs
//! cannot block here, so they are reported as acknowledged once printed.

use crate::core::{PresentationError, Presenter};
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Prints alerts to a writer, stdout by default.
pub struct ConsolePresenter {
    out: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(tokio::io::stdout()))
    }

    pub fn with_writer(out: Box<dyn AsyncWrite + Send + Unpin>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    async fn write_block(
        &self,
        kind: &str,
        title: &str,
        body: &str,
    ) -> Result<(), PresentationError> {
        let block = format_block(kind, title, body);
        let mut out = self.out.lock().await;
        out.write_all(block.as_bytes())
            .await
            .map_err(|e| PresentationError::Other(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| PresentationError::Other(e.to_string()))
    }
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_block(kind: &str, title: &str, body: &str) -> String {
    let mut block = format!("[{}] {}\n", kind, title);
    for line in body.lines() {
        block.push_str("    ");
        block.push_str(line);
        block.push('\n');
    }
    block
}

#[async_trait]
impl Presenter for ConsolePresenter {
    fn name(&self) -> &str {
        "console"
    }

    async fn present_notification(&self, title: &str, body: &str) -> Result<(), PresentationError> {
        self.write_block("notification", title, body).await
    }

    async fn present_dialog(&self, title: &str, body: &str) -> Result<bool, PresentationError> {
        self.write_block("popup", title, body).await?;
        Ok(true)
    }
}
