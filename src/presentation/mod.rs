//! Presentation backends.
//!
//! The alert pipeline only knows the `Presenter` trait; this module provides
//! the concrete surfaces and picks one from configuration.
pub mod console;
pub mod desktop;

pub use console::ConsolePresenter;
pub use desktop::DesktopPresenter;

use crate::config::PresenterKind;
use crate::core::Presenter;
use std::sync::Arc;

/// Builds the presenter selected in the configuration.
pub fn from_kind(kind: PresenterKind) -> Arc<dyn Presenter> {
    match kind {
        PresenterKind::Desktop => Arc::new(DesktopPresenter::new()),
        PresenterKind::Console => Arc::new(ConsolePresenter::new()),
    }
}
