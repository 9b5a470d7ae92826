//! Per-frame projection of the parameter store and animation clock into the uniform set.

use crate::{
    data_structures::{params::ParameterSet, uniforms::ShaderUniformSet},
    resources::texture::TextureId,
};

/// Writes `uTime`, `uSpeed`, `uDistortion` and `uFrequency` in place every frame, and
/// `uTexture` once, on the first frame a texture is available.
#[derive(Debug, Default)]
pub struct UniformSynchronizer {
    frames: u64,
}

impl UniformSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames that reached a uniform set.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Sync one frame.
    ///
    /// `uniforms` is `None` while the owning program is missing, e.g. in the window between
    /// a teardown and the rebuild. That case is skipped without complaint.
    ///
    /// Returns the texture that got bound on this call, if any.
    pub fn on_frame(
        &mut self,
        uniforms: Option<&mut ShaderUniformSet>,
        elapsed: f32,
        params: &ParameterSet,
        available: Option<TextureId>,
    ) -> Option<TextureId> {
        let uniforms = uniforms?;
        self.frames += 1;
        uniforms.write_scalars(elapsed, params);
        let texture = available?;
        uniforms.bind_texture(texture).then_some(texture)
    }
}
