//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the raw user input (`RawInput`) and its enumerated field types
//! - the district table and region rule (`district`)
//! - model-ready rows and prediction outputs (`AlignedRow`, `PredictionResult`)

pub mod district;
pub mod types;

pub use district::*;
pub use types::*;
