//! The entry processor: turns raw log lines into dispatched alerts.

use crate::{
    core::{LogEntry, RenderedAlert},
    dispatch::AlertDispatcher,
    extract::extract,
    resolver::NotifierResolver,
    template,
};
use std::fmt;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// The classification the host attaches to each log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    /// A query result record. The only kind that can produce alerts.
    String,
    Snapshot,
    Health,
    Init,
    Status,
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogType::String => "string",
            LogType::Snapshot => "snapshot",
            LogType::Health => "health",
            LogType::Init => "init",
            LogType::Status => "status",
        };
        write!(f, "{}", name)
    }
}

/// Why an entry did not produce an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The line was not a JSON object.
    Malformed,
    /// No notifier rule is registered for the event name.
    NotFound,
    /// The rule exists but is disabled.
    Disabled,
    /// The rule's template failed to parse.
    Template,
    /// The host classified the record as something other than a result.
    Unsupported,
}

impl SkipReason {
    fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Malformed => "malformed",
            SkipReason::NotFound => "not_found",
            SkipReason::Disabled => "disabled",
            SkipReason::Template => "template",
            SkipReason::Unsupported => "unsupported",
        }
    }
}

/// The result of processing one entry.
///
/// Hosts are free to ignore it; it exists so callers can observe what happened
/// without the processor ever returning an error.
#[derive(Debug)]
pub enum Outcome {
    /// An alert was handed to the dispatcher. The handle may be dropped.
    Dispatched(JoinHandle<()>),
    Skipped(SkipReason),
}

impl Outcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Outcome::Dispatched(_))
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Outcome::Skipped(reason) => Some(*reason),
            Outcome::Dispatched(_) => None,
        }
    }
}

/// Drives resolution, extraction, rendering and dispatch for each entry.
///
/// Everything up to dispatch runs synchronously on the caller's thread, in
/// delivery order. Dispatch is spawned and never awaited here.
#[derive(Clone)]
pub struct EntryProcessor {
    resolver: NotifierResolver,
    dispatcher: AlertDispatcher,
    verbose: bool,
}

impl EntryProcessor {
    pub fn new(resolver: NotifierResolver, dispatcher: AlertDispatcher) -> Self {
        Self {
            resolver,
            dispatcher,
            verbose: false,
        }
    }

    /// Logs every inbound record when enabled.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Host callback for a single log record.
    pub fn log_string(&self, log_type: LogType, text: &str) -> Outcome {
        if self.verbose {
            info!(log_type = %log_type, "{}", text);
        }

        if log_type != LogType::String {
            warn!(log_type = %log_type, "Ignoring log record that is not a result entry");
            return skipped(SkipReason::Unsupported);
        }
        self.process(text)
    }

    /// Processes one raw result line. Never fails; see `Outcome`.
    pub fn process(&self, raw: &str) -> Outcome {
        metrics::counter!("entries_processed").increment(1);

        let entry = match LogEntry::parse(raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Discarding malformed log entry");
                return skipped(SkipReason::Malformed);
            }
        };

        let Some(rule) = self.resolver.resolve(&entry.name) else {
            warn!(notifier = %entry.name, "Notifier configuration does not exist!");
            return skipped(SkipReason::NotFound);
        };

        if !rule.enabled {
            warn!(
                notifier = %entry.name,
                name = %rule.name,
                "Not processing alert as notifier is disabled"
            );
            return skipped(SkipReason::Disabled);
        }

        let values = extract(&entry.payload, rule.fields.as_slice());
        let body = match template::render(&rule.template, &values) {
            Ok(body) => body,
            Err(e) => {
                error!(notifier = %entry.name, error = %e, "Failed to render notifier template");
                return skipped(SkipReason::Template);
            }
        };

        let alert = RenderedAlert {
            presentation_type: rule.presentation_type,
            title: rule.name,
            body,
            action: entry.action,
            time: entry.calendar_time,
        };
        Outcome::Dispatched(self.dispatcher.dispatch(alert))
    }
}

fn skipped(reason: SkipReason) -> Outcome {
    metrics::counter!("entries_skipped", "reason" => reason.as_str()).increment(1);
    Outcome::Skipped(reason)
}
