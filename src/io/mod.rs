//! Input/output helpers.
//!
//! - model artifact lookup + loading (`model_file`)
//! - reference dataset CSV ingest (`dataset`)
//! - feature-list exports (`export`)

pub mod dataset;
pub mod export;
pub mod model_file;

pub use dataset::*;
pub use export::*;
pub use model_file::*;
