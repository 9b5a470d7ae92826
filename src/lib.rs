//! mist-warp
//!
//! Renders a full-viewport textured plane whose texture coordinates are pushed around by
//! 3D simplex noise, giving a liquid / heat-haze look. Flow speed, distortion strength,
//! noise frequency and the texture itself can be changed while it runs. Works natively and
//! on WASM.
//!
//! High-level modules
//! - `camera`: fixed perspective camera and the viewport-filling plane transform
//! - `config`: startup configuration
//! - `context`: window surface, device and queue
//! - `controls`: keyboard and file-drop controller
//! - `data_structures`: parameters, uniforms, plane mesh, GPU textures, the animation clock
//! - `error`: error taxonomy
//! - `flow`: event loop, parameter controller handle and texture load plumbing
//! - `noise`: CPU reference of the shader's noise and sampling math
//! - `pipelines`: the warp shader program
//! - `resources`: texture sources, loading and ownership
//! - `scene`: the scene host, one instance per texture generation
//! - `sync`: per-frame uniform synchronisation
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod noise;
pub mod pipelines;
pub mod resources;
pub mod scene;
pub mod sync;

// Re-exports commonly used types for convenience in downstream code.
pub use config::MistConfig;
pub use data_structures::params::{ParamKey, ParamUpdate, ParameterSet};
pub use flow::{Controller, run, run_with};
pub use resources::texture::TextureSource;
