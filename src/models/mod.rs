//! Models Module - Data Structures & Configuration
//!
//! Single source of truth for shared data types, the error taxonomy and
//! configuration. No hardcoded values outside this module and utils/constants.

pub mod config;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
