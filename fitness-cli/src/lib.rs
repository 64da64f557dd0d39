// Library exports for the fitness-assess CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
