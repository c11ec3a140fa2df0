//! Native desktop notifications and dialogs via the platform's command line
//! tools: `osascript` on macOS, `notify-send` and `zenity` on Linux.

use crate::core::{PresentationError, Presenter};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// A program invocation used to present an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: &'static str,
    pub args: Vec<String>,
}

/// The command line tool family available on a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
    Unsupported,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(any(target_os = "linux", target_os = "freebsd", target_os = "openbsd")) {
            Platform::Linux
        } else {
            Platform::Unsupported
        }
    }

    pub fn notification(&self, title: &str, body: &str) -> Option<Invocation> {
        match self {
            Platform::MacOs => Some(Invocation {
                program: "osascript",
                args: vec![
                    "-e".to_string(),
                    format!(
                        "display notification \"{}\" with title \"{}\" sound name \"default\"",
                        applescript_escape(body),
                        applescript_escape(title)
                    ),
                ],
            }),
            Platform::Linux => Some(Invocation {
                program: "notify-send",
                args: vec![
                    "--app-name=logalert".to_string(),
                    "--".to_string(),
                    title.to_string(),
                    body.to_string(),
                ],
            }),
            Platform::Unsupported => None,
        }
    }

    pub fn dialog(&self, title: &str, body: &str) -> Option<Invocation> {
        match self {
            Platform::MacOs => Some(Invocation {
                program: "osascript",
                args: vec![
                    "-e".to_string(),
                    format!(
                        "display dialog \"{}\" with title \"{}\" buttons {{\"OK\"}} default button \"OK\" with icon caution",
                        applescript_escape(body),
                        applescript_escape(title)
                    ),
                ],
            }),
            Platform::Linux => Some(Invocation {
                program: "zenity",
                args: vec![
                    "--warning".to_string(),
                    "--no-markup".to_string(),
                    format!("--title={}", title),
                    format!("--text={}", body),
                ],
            }),
            Platform::Unsupported => None,
        }
    }
}

/// Escapes a string for use inside an AppleScript string literal.
fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Presents alerts with the native tools of the current platform.
pub struct DesktopPresenter {
    platform: Platform,
}

impl DesktopPresenter {
    pub fn new() -> Self {
        Self {
            platform: Platform::current(),
        }
    }

    /// Runs `invocation` and returns whether it exited successfully. An exit
    /// code of 1 means the user dismissed the surface; anything else non-zero
    /// is a failure.
    async fn run(invocation: Invocation) -> Result<bool, PresentationError> {
        debug!(program = invocation.program, "Launching presentation command");
        let output = Command::new(invocation.program)
            .args(&invocation.args)
            .output()
            .await
            .map_err(|source| PresentationError::Spawn {
                program: invocation.program.to_string(),
                source,
            })?;

        if output.status.success() {
            return Ok(true);
        }
        if output.status.code() == Some(1) {
            return Ok(false);
        }
        Err(PresentationError::Failed {
            program: invocation.program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Default for DesktopPresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Presenter for DesktopPresenter {
    fn name(&self) -> &str {
        "desktop"
    }

    async fn present_notification(&self, title: &str, body: &str) -> Result<(), PresentationError> {
        let invocation = self
            .platform
            .notification(title, body)
            .ok_or(PresentationError::Unsupported)?;
        let program = invocation.program;
        if Self::run(invocation).await? {
            Ok(())
        } else {
            Err(PresentationError::Other(format!("{} exited with status 1", program)))
        }
    }

    async fn present_dialog(&self, title: &str, body: &str) -> Result<bool, PresentationError> {
        let invocation = self
            .platform
            .dialog(title, body)
            .ok_or(PresentationError::Unsupported)?;
        Self::run(invocation).await
    }
}
