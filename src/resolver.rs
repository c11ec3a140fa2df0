//! Resolution of event names to notifier rules.

use crate::core::{NotifierRule, RuleSource};
use std::sync::Arc;
use tracing::error;

/// Looks up notifier rules in an injected `RuleSource`.
#[derive(Clone)]
pub struct NotifierResolver {
    source: Arc<dyn RuleSource>,
}

impl NotifierResolver {
    pub fn new(source: Arc<dyn RuleSource>) -> Self {
        Self { source }
    }

    /// Returns the rule registered for `event_name`, enabled or not.
    ///
    /// An empty rule source is reported on every call, since no event can
    /// ever alert in that state, but it is not treated as fatal.
    pub fn resolve(&self, event_name: &str) -> Option<NotifierRule> {
        if self.source.rule_count() == 0 {
            error!("no notifier configurations could be found. no alerts will fire.");
            return None;
        }
        self.source.get(event_name)
    }
}
