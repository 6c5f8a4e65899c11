//! Core Module - Analysis Engines
//!
//! Concentration scoring, whale flow & funding tracing, dominance trend
//! tracking, verdict synthesis, and the pipeline that runs them together.

pub mod analyzer;
pub mod concentration;
pub mod dominance;
pub mod verdict;
pub mod whale;

pub use analyzer::*;
pub use concentration::*;
pub use dominance::*;
pub use verdict::*;
pub use whale::*;
