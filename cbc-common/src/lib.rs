//! # CBC Common Library
//!
//! Observation store and translation rules shared by the CBC result tools:
//! - Fact store of normalized (kind, name, qualifier, value) observations
//! - Species reference lists and the total-species tally
//! - Per-dataset load tracking for idempotent loads
//! - Query facade and per-destination translation rules
//! - Configuration loading and database initialization

pub mod config;
pub mod db;
pub mod error;
pub mod query;
pub mod reference;
pub mod report;
pub mod source;
pub mod store;
pub mod tracker;
pub mod translate;

pub use error::{Error, Result};
