//! The notifier rule store: an atomically swappable snapshot of rules.

use crate::core::{NotifierRule, RuleSource};
use crate::template::Template;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Notifier rules keyed by event name.
pub type NotifierMap = HashMap<String, NotifierRule>;

/// Holds the current set of notifier rules.
///
/// Clones share the same underlying snapshot, so a reload through one handle
/// is visible to every reader. Readers never block writers.
#[derive(Clone, Default)]
pub struct NotifierStore {
    current: Arc<ArcSwap<NotifierMap>>,
}

impl NotifierStore {
    /// Creates a store holding `rules`.
    pub fn new(rules: NotifierMap) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(rules)),
        }
    }

    /// Atomically replaces the whole rule set.
    pub fn replace(&self, rules: NotifierMap) {
        self.current.store(Arc::new(rules));
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<NotifierMap> {
        self.current.load_full()
    }
}

impl RuleSource for NotifierStore {
    fn rule_count(&self) -> usize {
        self.current.load().len()
    }

    fn get(&self, name: &str) -> Option<NotifierRule> {
        self.current.load().get(name).cloned()
    }
}

/// Reports configuration mistakes that would otherwise only surface when a
/// matching event arrives. Returns the number of problems found.
///
/// Nothing here rejects a rule: broken templates are skipped per entry, and
/// placeholders outside `fields` render as empty strings.
pub fn lint_rules(rules: &NotifierMap) -> usize {
    let mut problems = 0;
    for (event, rule) in rules {
        match Template::parse(&rule.template) {
            Ok(template) => {
                for name in template.placeholders() {
                    if !rule.fields.iter().any(|f| f == name) {
                        warn!(
                            notifier = %event,
                            placeholder = name,
                            "Template placeholder is not listed in fields and will render empty"
                        );
                        problems += 1;
                    }
                }
            }
            Err(e) => {
                warn!(notifier = %event, error = %e, "Notifier template does not parse");
                problems += 1;
            }
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PresentationType;

    fn rule(fields: &[&str], template: &str) -> NotifierRule {
        NotifierRule {
            name: "test".to_string(),
            enabled: true,
            presentation_type: PresentationType::Notification,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            template: template.to_string(),
        }
    }

    #[test]
    fn test_replace_is_visible_through_clones() {
        let store = NotifierStore::default();
        let reader = store.clone();
        assert_eq!(reader.rule_count(), 0);

        store.replace(HashMap::from([("a".to_string(), rule(&[], ""))]));
        assert_eq!(reader.rule_count(), 1);
        assert!(reader.get("a").is_some());
    }

    #[test]
    fn test_snapshot_is_stable_across_replace() {
        let store = NotifierStore::new(HashMap::from([("a".to_string(), rule(&[], ""))]));
        let before = store.snapshot();
        store.replace(NotifierMap::new());

        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 0);
    }

    #[test]
    fn test_lint_rules() {
        let rules = HashMap::from([
            ("ok".to_string(), rule(&["vendor"], "{{vendor}}")),
            ("extra".to_string(), rule(&[], "{{missing}}")),
            ("broken".to_string(), rule(&["vendor"], "{{vendor")),
        ]);
        assert_eq!(lint_rules(&rules), 2);
    }
}
