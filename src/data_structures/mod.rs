//! Engine data structures.
//!
//! - `clock` is the per-scene animation clock
//! - `params` holds the live effect parameters and their store
//! - `plane` is the viewport-filling plane mesh
//! - `texture` is the GPU side of a loaded texture
//! - `uniforms` mirrors the warp shader's uniform block on the CPU

pub mod clock;
pub mod params;
pub mod plane;
pub mod texture;
pub mod uniforms;
