//! On-device fitness test engine
//!
//! Turns a stream of body-keypoint detections into repetition counts and form
//! scores ([`ExerciseTracker`]), then normalizes the result against age and
//! gender reference bands ([`ScoringService`]).

pub mod config;
pub mod errors;
pub mod models;
pub mod services;

pub use config::EngineConfig;
pub use errors::{EngineError, Result};
pub use services::{ExerciseTracker, NormativeTable, ScoringService};
