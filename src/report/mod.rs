//! Output rendering for dashboard snapshots.

pub mod generator;

pub use generator::{render_json, render_text, write_output};
