//! Model artifacts, contracts and loaded pipelines.
//!
//! - `artifact`: the JSON schema of a serialized pipeline
//! - `contract`: load-time validation producing a typed `ModelContract`
//! - `classifier`: probability evaluation per classifier kind
//! - `pipeline`: the `ClassifierPipeline` trait and its artifact-backed impl
//! - `cache`: one loaded pipeline per path for the process lifetime

pub mod artifact;
pub mod cache;
pub mod classifier;
pub mod contract;
pub mod pipeline;

pub use artifact::*;
pub use cache::ModelCache;
pub use contract::*;
pub use pipeline::*;
