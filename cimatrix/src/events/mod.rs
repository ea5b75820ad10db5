//! Event sink system for observability.
//!
//! The phase runner reports its progress as typed events:
//!
//! - `pipeline.started`, `pipeline.disabled`
//! - `phase.started`, `phase.completed`, `phase.skipped`, `phase.failed`
//! - `pipeline.completed`, `pipeline.failed`

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
