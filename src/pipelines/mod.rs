//! Render pipelines.
//!
//! - `warp` is the noise-displacement pipeline and its WGSL source

pub mod warp;
