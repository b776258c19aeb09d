//! Run reporting pipeline
//!
//! Aggregates raw per-test results into totals and fans the report out to
//! the enabled sinks. Case management goes first so its run handle can
//! cross-link the chat notification; a failing sink never stops the others.

pub mod aggregate;
pub mod router;
pub mod slack;
pub mod testrail;

pub use aggregate::AggregateReport;
pub use router::{CaseSink, ChatSink, ReportRouter};
pub use slack::SlackSink;
pub use testrail::TestRailSink;
