//! Startup configuration.

use crate::{data_structures::params::ParameterSet, resources::texture::TextureSource};

/// Everything that is fixed for the lifetime of a run.
///
/// Build it with `MistConfig::default()` and the `with_*` methods, then pass it to
/// [`crate::flow::run`].
#[derive(Clone, Debug)]
pub struct MistConfig {
    pub title: String,
    /// Values the parameter store starts with and that `R` restores.
    pub initial: ParameterSet,
    /// Grid resolution of the plane along each axis.
    pub plane_segments: u32,
    pub fov_degrees: f32,
    pub camera_distance: f32,
    /// Shown while a texture loads and around the plane.
    pub clear_colour: wgpu::Color,
}

impl Default for MistConfig {
    fn default() -> Self {
        Self {
            title: "WARP.FX".to_string(),
            initial: ParameterSet::default(),
            plane_segments: 64,
            fov_degrees: 75.0,
            camera_distance: 1.0,
            clear_colour: wgpu::Color::BLACK,
        }
    }
}

impl MistConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_params(mut self, params: ParameterSet) -> Self {
        self.initial = params;
        self
    }

    pub fn with_texture(mut self, source: TextureSource) -> Self {
        self.initial.texture = source;
        self
    }

    pub fn with_clear_colour(mut self, colour: wgpu::Color) -> Self {
        self.clear_colour = colour;
        self
    }

    pub fn with_plane_segments(mut self, segments: u32) -> Self {
        self.plane_segments = segments;
        self
    }
}
