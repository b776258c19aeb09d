//! QARelay suite runner
//!
//! Loads declarative YAML suites and executes their cases as child
//! processes, recording one raw result per case for reporting.

pub mod error;
pub mod exec;
pub mod runner;
pub mod suite;

pub use error::{RunnerError, RunnerResult};
pub use runner::{RunRecord, SuiteRunner};
pub use suite::{TestCase, TestGroup, TestSuite};
