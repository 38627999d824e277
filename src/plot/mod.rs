//! Terminal charts.

pub mod bars;

pub use bars::render_bars;
