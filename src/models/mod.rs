// Data contracts consumed and produced by the engine

pub mod exercise;
pub mod keypoint;
pub mod scoring;

pub use exercise::*;
pub use keypoint::*;
pub use scoring::*;
