/// logalert - Desktop alerts for endpoint monitoring results
///
/// This library turns result log records from an endpoint monitoring agent
/// into native notifications and dialogs, driven by user-configured notifier
/// rules.
pub mod cli;
pub mod config;
pub mod config_watch;
pub mod core;
pub mod dispatch;
pub mod extract;
pub mod input;
pub mod presentation;
pub mod processor;
pub mod resolver;
pub mod store;
pub mod template;

// Re-export core types for convenience
pub use crate::core::*;

use crate::{
    dispatch::AlertDispatcher, processor::EntryProcessor, resolver::NotifierResolver,
    store::NotifierStore,
};
use std::sync::Arc;

/// Wires a rule store and a presenter into a ready-to-use entry processor.
pub fn build_processor(store: NotifierStore, presenter: Arc<dyn Presenter>) -> EntryProcessor {
    EntryProcessor::new(
        NotifierResolver::new(Arc::new(store)),
        AlertDispatcher::new(presenter),
    )
}
