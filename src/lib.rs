//! `house-price-predictor` library crate.
//!
//! The binary (`hpp`) is a thin wrapper around this library so that:
//!
//! - feature alignment is testable without spawning processes
//! - both front-ends (one-shot and interactive) share one serving path
//! - code stays easy to navigate as the project grows

pub mod align;
pub mod app;
pub mod cli;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod models;
pub mod plot;
pub mod report;
