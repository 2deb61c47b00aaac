//! Ingestion and reconciliation pipeline for exercise-machine workout logs.
//!
//! Raw DAT payloads flow through [`tokenizer`] and [`normalize`] into a
//! canonical [`HistoryTable`], get folded into the persisted history by
//! [`merge`], and are queried through [`query`], [`timeseries`] and
//! [`chart`]. [`service::WorkoutService`] wires the steps together for a
//! single request.

use thiserror::Error;

pub mod chart;
pub mod config;
pub mod merge;
pub mod normalize;
pub mod query;
pub mod service;
pub mod store;
pub mod table;
pub mod timeseries;
pub mod tokenizer;
pub mod utils;

pub use config::HistoryConfig;
pub use service::WorkoutService;
pub use store::{CsvHistoryStore, HistoryStore};
pub use table::{Field, HistoryTable, WorkoutRecord};

#[derive(Debug, Error)]
pub enum WorkoutError {
    #[error("no workout objects found in DAT payload")]
    NoWorkoutData,
    #[error("malformed workout record #{index}: {reason}")]
    MalformedInput { index: usize, reason: String },
    #[error("missing required columns in history table: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Unsupported field '{value}' (allowed: {})", .allowed.join(", "))]
    InvalidField { value: String, allowed: Vec<String> },
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

pub type WorkoutResult<T> = Result<T, WorkoutError>;
