//! Structured logging for framegrab.
//!
//! Console + rolling NDJSON output, token redaction, and per-flow event records.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{FlowEvent, FlowLogEntry, FlowLogger};
pub use logger::{init_logger, LoggerGuard};
pub use redact::redact_sensitive_data;
