//! CLI Commands

pub mod cleanup;
pub mod config;
pub mod inbox;
pub mod report;
pub mod run;
