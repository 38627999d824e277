//! Feature alignment between user input and a loaded pipeline.

pub mod aligner;
pub mod layout;

pub use aligner::*;
pub use layout::*;
