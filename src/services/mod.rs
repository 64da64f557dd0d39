// Tracking and scoring services

pub mod analyzers;
pub mod exercise_tracker;
pub mod geometry;
pub mod normative_data;
pub mod scoring_service;

pub use analyzers::{analyzer_for, AnalysisResult, Baseline, ExerciseAnalyzer, PhaseCycle};
pub use exercise_tracker::{ExerciseTracker, SessionState, StepDetector};
pub use normative_data::NormativeTable;
pub use scoring_service::ScoringService;
