//! Core domain types and service traits for logalert
//!
//! This module defines the data that flows through the alert pipeline and
//! the trait contracts at its two external seams: the notifier rule source
//! and the presentation backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single result log record delivered by the monitoring agent.
///
/// Constructed fresh from each inbound line and never mutated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogEntry {
    /// The event (query pack) name, used to look up a notifier rule.
    pub name: String,
    /// The differential action, e.g. "added" or "removed".
    pub action: String,
    /// The timestamp exactly as supplied upstream.
    pub calendar_time: String,
    /// The full decoded record. Fields live under `columns`.
    pub payload: Value,
}

impl LogEntry {
    /// Decodes a raw JSON log line.
    ///
    /// Missing top-level string fields default to the empty string.
    pub fn parse(raw: &str) -> Result<Self, EntryError> {
        let payload: Value = serde_json::from_str(raw)?;
        if !payload.is_object() {
            return Err(EntryError::NotAnObject);
        }

        let text = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Ok(Self {
            name: text("name"),
            action: text("action"),
            calendar_time: text("calendarTime"),
            payload,
        })
    }
}

/// Reasons a raw log line could not be turned into a `LogEntry`.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error("log entry is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("log entry is not a JSON object")]
    NotAnObject,
}

/// The UI surface used to show an alert.
///
/// Unrecognised configuration values are preserved as `Unknown` so the
/// dispatcher can apply its fallback instead of failing at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PresentationType {
    /// A transient OS notification.
    Notification,
    /// A blocking dialog the user has to dismiss.
    Dialog,
    /// Anything else, with the configured value kept verbatim.
    Unknown(String),
}

impl Default for PresentationType {
    fn default() -> Self {
        PresentationType::Unknown(String::new())
    }
}

impl From<String> for PresentationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "notification" => PresentationType::Notification,
            "popup" | "dialog" => PresentationType::Dialog,
            _ => PresentationType::Unknown(value),
        }
    }
}

impl From<PresentationType> for String {
    fn from(value: PresentationType) -> Self {
        match value {
            PresentationType::Notification => "notification".to_string(),
            PresentationType::Dialog => "popup".to_string(),
            PresentationType::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for PresentationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentationType::Notification => write!(f, "notification"),
            PresentationType::Dialog => write!(f, "popup"),
            PresentationType::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// A user-configured mapping from an event name to presentation behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NotifierRule {
    /// Display name, used as the alert title.
    #[serde(default)]
    pub name: String,
    /// Disabled rules are resolved but never dispatched.
    #[serde(default)]
    pub enabled: bool,
    /// How the alert is presented.
    #[serde(rename = "type", default)]
    pub presentation_type: PresentationType,
    /// Field names to extract from `columns`, in configured order.
    #[serde(default)]
    pub fields: Vec<String>,
    /// The message template.
    #[serde(default)]
    pub template: String,
}

/// A fully rendered alert, ready to be handed to a presentation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAlert {
    pub presentation_type: PresentationType,
    /// The rule's display name.
    pub title: String,
    /// The rendered template text.
    pub body: String,
    /// The originating entry's action.
    pub action: String,
    /// The originating entry's calendar time.
    pub time: String,
}

/// Errors reported by a presentation backend.
#[derive(Debug, thiserror::Error)]
pub enum PresentationError {
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("presentation is not supported on this platform")]
    Unsupported,
    #[error("{0}")]
    Other(String),
}

// =============================================================================
// Service Traits
// =============================================================================

/// Read-only access to the configured notifier rules.
///
/// Implementations may be reloaded externally; each call observes a
/// consistent snapshot, but two calls may observe different snapshots.
pub trait RuleSource: Send + Sync {
    /// Returns the number of registered rules.
    fn rule_count(&self) -> usize;

    /// Returns a copy of the rule registered under `name`, if any.
    fn get(&self, name: &str) -> Option<NotifierRule>;
}

/// An OS-level surface that can show alerts to the user.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// A short name for the backend, used in logs.
    fn name(&self) -> &str;

    /// Shows a transient notification.
    async fn present_notification(&self, title: &str, body: &str)
        -> Result<(), PresentationError>;

    /// Shows a blocking dialog.
    ///
    /// # Returns
    /// * `Ok(true)` if the user acknowledged the dialog
    /// * `Ok(false)` if it was dismissed without acknowledgement
    /// * `Err` if the dialog could not be shown
    async fn present_dialog(&self, title: &str, body: &str) -> Result<bool, PresentationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_entry() {
        let raw = r#"{"name":"pack_hardware_usb_devices","action":"added","calendarTime":"Tue Jul  8 12:00:00 2025 UTC","columns":{"vendor":"Acme"}}"#;
        let entry = LogEntry::parse(raw).unwrap();

        assert_eq!(entry.name, "pack_hardware_usb_devices");
        assert_eq!(entry.action, "added");
        assert_eq!(entry.calendar_time, "Tue Jul  8 12:00:00 2025 UTC");
        assert_eq!(entry.payload["columns"]["vendor"], "Acme");
    }

    #[test]
    fn test_parse_log_entry_missing_fields_default_to_empty() {
        let entry = LogEntry::parse(r#"{"name":"x"}"#).unwrap();
        assert_eq!(entry.action, "");
        assert_eq!(entry.calendar_time, "");
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(LogEntry::parse("[1,2]"), Err(EntryError::NotAnObject)));
        assert!(matches!(LogEntry::parse("{not json"), Err(EntryError::Json(_))));
    }

    #[test]
    fn test_presentation_type_preserves_unknown_values() {
        assert_eq!(
            PresentationType::from("popup".to_string()),
            PresentationType::Dialog
        );
        assert_eq!(
            PresentationType::from("notification".to_string()),
            PresentationType::Notification
        );
        assert_eq!(
            PresentationType::from("banner".to_string()),
            PresentationType::Unknown("banner".to_string())
        );
        assert_eq!(String::from(PresentationType::Unknown("banner".into())), "banner");
    }

    #[test]
    fn test_rule_deserializes_with_type_key() {
        let rule: NotifierRule = serde_json::from_str(
            r#"{"name":"USB","enabled":true,"type":"popup","fields":["vendor"],"template":"{{vendor}}"}"#,
        )
        .unwrap();
        assert_eq!(rule.presentation_type, PresentationType::Dialog);
        assert_eq!(rule.fields, vec!["vendor".to_string()]);
    }
}
