//! Library crate for registry-spray-rs exposing reusable modules.
pub mod config;
pub mod engine;
pub mod inputs;
pub mod output;
pub mod partition;
pub mod probe;
pub mod report;
pub mod types;
pub mod worker;
