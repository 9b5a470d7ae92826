//! Error taxonomy.
//!
//! Every failure the renderer can surface falls in one of three buckets:
//!
//! - [`ResourceLoadError`] is recoverable. The scene falls back to the built-in texture.
//! - [`SurfaceInitError`] is fatal at startup and handed back to the caller.
//! - [`ShaderCompileError`] is fatal for one scene instance, which then refuses to draw.

use std::path::PathBuf;

use thiserror::Error;

/// Fetching or decoding a texture failed.
#[derive(Debug, Error)]
pub enum ResourceLoadError {
    #[error("could not read texture file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not fetch texture from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not decode texture {label}: {source}")]
    Decode {
        label: String,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {label} has no pixels")]
    Empty { label: String },
}

/// No usable render context could be created for the window.
#[derive(Debug, Error)]
pub enum SurfaceInitError {
    #[error("could not create a surface for the window: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible graphics adapter: {0}")]
    Adapter(String),
    #[error("could not open the graphics device: {0}")]
    Device(String),
    #[error("the surface reports no supported texture formats")]
    NoSurfaceFormat,
}

/// The warp shader failed to parse or validate.
#[derive(Debug, Error)]
pub enum ShaderCompileError {
    #[error("shader {label} does not parse:\n{message}")]
    Parse { label: String, message: String },
    #[error("shader {label} does not validate:\n{message}")]
    Validation { label: String, message: String },
}

/// A [`crate::flow::Controller`] was used after its event loop shut down.
#[derive(Debug, Error)]
#[error("the render loop has exited, parameter update dropped")]
pub struct ControllerClosed;
