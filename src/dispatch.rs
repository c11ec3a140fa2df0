//! Asynchronous dispatch of rendered alerts to a presentation backend.
//!
//! Every call to [`AlertDispatcher::dispatch`] spawns an independent tokio
//! task and returns at once. Tasks share no mutable state and are not
//! ordered: two alerts dispatched back to back may be presented in either
//! order or at the same time. There is no queue, so there is no backpressure,
//! and a presentation is never cancelled or retried.

use crate::core::{PresentationType, Presenter, RenderedAlert};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, Instrument};

/// Title used for blocking dialogs. The rule name leads the dialog body.
pub const DIALOG_TITLE: &str = "Alert!";

/// Hands rendered alerts to a `Presenter` on background tasks.
#[derive(Clone)]
pub struct AlertDispatcher {
    presenter: Arc<dyn Presenter>,
    runtime: Handle,
}

impl AlertDispatcher {
    /// Creates a dispatcher bound to the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime. Use [`AlertDispatcher::with_runtime`]
    /// to bind to a runtime explicitly.
    pub fn new(presenter: Arc<dyn Presenter>) -> Self {
        Self::with_runtime(presenter, Handle::current())
    }

    pub fn with_runtime(presenter: Arc<dyn Presenter>, runtime: Handle) -> Self {
        Self { presenter, runtime }
    }

    /// Spawns a task on the bound runtime that presents `alert`.
    ///
    /// The returned handle may be dropped; the task keeps running. The caller
    /// does not need to be inside the runtime, so host callback threads can
    /// dispatch directly.
    pub fn dispatch(&self, alert: RenderedAlert) -> JoinHandle<()> {
        let presenter = self.presenter.clone();
        metrics::counter!("alerts_dispatched", "type" => alert.presentation_type.to_string())
            .increment(1);
        self.runtime.spawn(present(presenter, alert).in_current_span())
    }
}

/// Presents a single alert. Failures are logged and swallowed.
#[instrument(skip_all, fields(presenter = presenter.name(), title = %alert.title))]
pub async fn present(presenter: Arc<dyn Presenter>, alert: RenderedAlert) {
    match &alert.presentation_type {
        PresentationType::Notification => {
            info!(body = %alert.body, "Sending notification");
            if let Err(e) = presenter
                .present_notification(&alert.title, &alert.body)
                .await
            {
                record_failure(&alert.presentation_type);
                error!(error = %e, "error sending notification");
            }
        }
        PresentationType::Dialog => {
            info!(body = %alert.body, "Sending popup");
            match presenter
                .present_dialog(DIALOG_TITLE, &dialog_body(&alert))
                .await
            {
                Ok(acknowledged) => debug!(acknowledged, "Popup closed"),
                Err(e) => {
                    record_failure(&alert.presentation_type);
                    error!(error = %e, "error sending popup");
                }
            }
        }
        PresentationType::Unknown(kind) => {
            let message = format!(
                "received message with unknown alert type '{}'. message was: {}",
                kind, alert.body
            );
            if let Err(e) = presenter.present_notification(&alert.title, &message).await {
                record_failure(&alert.presentation_type);
                error!(error = %e, "error sending fallback notification");
            }
            error!(alert_type = %kind, "{}", message);
        }
    }
}

/// Builds the body of a blocking dialog.
pub fn dialog_body(alert: &RenderedAlert) -> String {
    format!(
        "{}\n\nAction: {}\nTime: {}\n\n{}",
        alert.title,
        title_case(&alert.action),
        alert.time,
        alert.body
    )
}

/// Upper-cases the first letter of every whitespace separated word.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start && !c.is_whitespace() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    out
}

fn record_failure(kind: &PresentationType) {
    metrics::counter!("presentation_failures", "type" => kind.to_string()).increment(1);
}
