//! Flow Event Logger
//!
//! One structured record per screenshot-flow milestone, emitted under the
//! `flow_events` target so it can be filtered out of the NDJSON log.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowEvent {
    Requested {
        flow: String,
        source: String,
    },
    Extracted {
        requested: usize,
        produced: usize,
    },
    Aborted {
        reason: String,
    },
    Failed {
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct FlowLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: FlowEvent,
}

pub struct FlowLogger;

impl FlowLogger {
    /// Redact free-text fields and emit the event.
    pub fn log_event(session_id: &str, event: FlowEvent) {
        let entry = Self::entry(session_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "flow_events", session_id = %entry.session_id, event = %json, "Flow event");
    }

    fn entry(session_id: &str, mut event: FlowEvent) -> FlowLogEntry {
        match &mut event {
            FlowEvent::Requested { source, .. } => *source = redact_sensitive_data(source),
            FlowEvent::Aborted { reason } => *reason = redact_sensitive_data(reason),
            FlowEvent::Failed { error_msg } => *error_msg = redact_sensitive_data(error_msg),
            FlowEvent::Extracted { .. } => {}
        }
        FlowLogEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }
}
