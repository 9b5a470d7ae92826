//! GPU textures.
//!
//! [`Texture`] is the uploaded form of a [`TextureResource`]: a wgpu texture, its view and
//! the sampler built from the resource's [`SamplingConfig`].

use crate::resources::texture::{SamplingConfig, TextureId, TextureResource};

#[derive(Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    /// The resource this texture was uploaded from.
    pub source: TextureId,
}

impl Texture {
    /// Upload `resource` as an sRGB texture.
    ///
    /// An unconfigured resource is sampled with [`SamplingConfig::WARP`] anyway, since the
    /// warp shader is only correct under mirrored repeat.
    pub fn from_resource(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        resource: &TextureResource,
    ) -> Self {
        let (width, height) = resource.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(resource.label()),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            resource.image(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampling = resource.sampling().copied().unwrap_or(SamplingConfig::WARP);
        let sampler = device.create_sampler(&sampling.descriptor());

        Self {
            texture,
            view,
            sampler,
            source: resource.id(),
        }
    }
}
