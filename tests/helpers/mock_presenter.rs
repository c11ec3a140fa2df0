#![allow(dead_code)]
use async_trait::async_trait;
use logalert::core::{PresentationError, Presenter};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

/// A single call made to a presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presented {
    Notification { title: String, body: String },
    Dialog { title: String, body: String },
}

/// A mock Presenter that records every call and can be slowed down or made to fail.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<Presented>>,
    notifier: Notify,
    delay: Option<Duration>,
    fail: bool,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every presentation takes `delay` before it is recorded.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Every presentation is recorded and then fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Presented> {
        self.calls.lock().unwrap().clone()
    }

    pub async fn wait_for_count(&self, target_count: usize, timeout_duration: Duration) {
        let wait_future = async {
            loop {
                let notified = self.notifier.notified();
                if self.calls.lock().unwrap().len() >= target_count {
                    break;
                }
                notified.await;
            }
        };

        tokio::time::timeout(timeout_duration, wait_future)
            .await
            .expect("Timed out waiting for presentations");
    }

    async fn record(&self, call: Presented) -> Result<(), PresentationError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(call);
        self.notifier.notify_waiters();
        if self.fail {
            return Err(PresentationError::Other("mock presenter failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    fn name(&self) -> &str {
        "recording_mock"
    }

    async fn present_notification(&self, title: &str, body: &str) -> Result<(), PresentationError> {
        self.record(Presented::Notification {
            title: title.to_string(),
            body: body.to_string(),
        })
        .await
    }

    async fn present_dialog(&self, title: &str, body: &str) -> Result<bool, PresentationError> {
        self.record(Presented::Dialog {
            title: title.to_string(),
            body: body.to_string(),
        })
        .await?;
        Ok(true)
    }
}
