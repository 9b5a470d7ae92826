//! CPU side of the warp shader's uniforms.

use crate::{data_structures::params::ParameterSet, resources::texture::TextureId};

/// The scalar uniform block as laid out in `warp.wgsl`.
///
/// Four `f32`s pack into exactly one 16 byte row, so no padding is needed.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WarpUniform {
    pub time: f32,
    pub speed: f32,
    pub distortion: f32,
    pub frequency: f32,
}

/// `uTime`, `uSpeed`, `uDistortion`, `uFrequency` and `uTexture` of one shader program.
///
/// The set is created once per program and mutated in place afterwards. The texture slot is
/// write-once: a program serves a single texture for its whole life.
#[derive(Debug)]
pub struct ShaderUniformSet {
    scalars: WarpUniform,
    texture: Option<TextureId>,
}

impl ShaderUniformSet {
    pub fn new(params: &ParameterSet) -> Self {
        Self {
            scalars: WarpUniform {
                time: 0.0,
                speed: params.speed,
                distortion: params.distortion,
                frequency: params.frequency,
            },
            texture: None,
        }
    }

    pub fn time(&self) -> f32 {
        self.scalars.time
    }

    pub fn speed(&self) -> f32 {
        self.scalars.speed
    }

    pub fn distortion(&self) -> f32 {
        self.scalars.distortion
    }

    pub fn frequency(&self) -> f32 {
        self.scalars.frequency
    }

    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    pub fn raw(&self) -> &WarpUniform {
        &self.scalars
    }

    pub(crate) fn write_scalars(&mut self, time: f32, params: &ParameterSet) {
        self.scalars.time = time;
        self.scalars.speed = params.speed;
        self.scalars.distortion = params.distortion;
        self.scalars.frequency = params.frequency;
    }

    /// Bind `id` if nothing is bound yet. Returns whether the binding changed.
    pub(crate) fn bind_texture(&mut self, id: TextureId) -> bool {
        match self.texture {
            Some(_) => false,
            None => {
                self.texture = Some(id);
                true
            }
        }
    }
}
