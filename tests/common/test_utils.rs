#![allow(dead_code)]

use std::io::Cursor;

use mist_warp::{
    data_structures::params::ParameterSet,
    resources::texture::{Generation, TextureManager, TextureResource, TextureSource},
};

/// A `width` x `height` image filled with one colour.
pub(crate) fn solid(width: u32, height: u32, colour: [u8; 4]) -> image::RgbaImage {
    image::RgbaImage::from_pixel(width, height, image::Rgba(colour))
}

/// Horizontal ramp from black to white, identical on every row.
pub(crate) fn ramp(width: u32, height: u32) -> image::RgbaImage {
    image::RgbaImage::from_fn(width, height, |x, _| {
        let v = (x * 255 / (width - 1).max(1)) as u8;
        image::Rgba([v, v, v, 255])
    })
}

pub(crate) fn png_bytes(image: &image::RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub(crate) fn bytes_source(image: &image::RgbaImage) -> TextureSource {
    TextureSource::Bytes(png_bytes(image).into())
}

/// Resolve `source` synchronously. Only for sources that need no runtime (default, bytes).
pub(crate) fn resolve_now(source: TextureSource) -> TextureResource {
    futures::executor::block_on(TextureManager::resolve(source)).unwrap()
}

/// A manager at `generation` with `source` already loaded and installed.
pub(crate) fn loaded_manager(generation: Generation, source: TextureSource) -> TextureManager {
    let mut manager = TextureManager::new(generation);
    let ticket = manager.ticket(source.clone());
    let result = futures::executor::block_on(TextureManager::resolve(source));
    manager.complete(&ticket, result);
    manager
}

pub(crate) fn params(speed: f32, distortion: f32, frequency: f32) -> ParameterSet {
    ParameterSet {
        speed,
        distortion,
        frequency,
        ..ParameterSet::default()
    }
}

pub(crate) fn assert_close(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} within {} of {}",
        actual,
        tolerance,
        expected
    );
}

#[cfg(feature = "integration-tests")]
pub(crate) mod gpu {
    use std::iter;

    use cgmath::Deg;
    use mist_warp::{
        camera::CameraRig,
        data_structures::{
            params::ParameterSet, plane::PlaneGeometry, texture::Texture,
        },
        pipelines::warp::ShaderProgram,
        sync::UniformSynchronizer,
    };

    pub(crate) const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
    /// 64 texels of 4 bytes is exactly one 256 byte copy row.
    pub(crate) const TARGET_SIZE: u32 = 64;

    /// A device without a surface, or `None` when the machine has no adapter.
    pub(crate) fn headless() -> Option<(wgpu::Device, wgpu::Queue)> {
        futures::executor::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .ok()?;
            adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                    memory_hints: Default::default(),
                    trace: wgpu::Trace::Off,
                })
                .await
                .ok()
        })
    }

    /// Everything a scene draws with, minus the window.
    pub(crate) struct OffscreenScene {
        pub(crate) rig: CameraRig,
        pub(crate) plane: PlaneGeometry,
        pub(crate) program: ShaderProgram,
        pub(crate) synchronizer: UniformSynchronizer,
    }

    impl OffscreenScene {
        pub(crate) fn new(device: &wgpu::Device, params: &ParameterSet) -> Self {
            let rig = CameraRig::new(device, [TARGET_SIZE, TARGET_SIZE], Deg(75.0), 1.0);
            let program =
                ShaderProgram::new(device, TARGET_FORMAT, &rig.bind_group_layout, params).unwrap();
            Self {
                rig,
                plane: PlaneGeometry::new(device, 16),
                program,
                synchronizer: UniformSynchronizer::new(),
            }
        }

        /// One frame of uniform sync at `time`, binding `texture` if it is the first.
        pub(crate) fn frame(
            &mut self,
            device: &wgpu::Device,
            queue: &wgpu::Queue,
            time: f32,
            params: &ParameterSet,
            texture: &Texture,
        ) {
            let bound = self.synchronizer.on_frame(
                Some(self.program.uniforms_mut()),
                time,
                params,
                Some(texture.source),
            );
            if bound.is_some() {
                self.program.bind_texture(device, texture);
            }
            self.program.upload(queue);
        }

        /// Draw into a fresh target and read it back.
        pub(crate) fn render(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> image::RgbaImage {
            let size = wgpu::Extent3d {
                width: TARGET_SIZE,
                height: TARGET_SIZE,
                depth_or_array_layers: 1,
            };
            let target = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("test target"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TARGET_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            });
            let view = target.create_view(&wgpu::TextureViewDescriptor::default());
            let bytes_per_row = 4 * TARGET_SIZE;
            let output = device.create_buffer(&wgpu::BufferDescriptor {
                label: None,
                size: (bytes_per_row * TARGET_SIZE) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            });

            let mut encoder =
                device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
            {
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("test pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });
                self.program
                    .draw(&mut render_pass, &self.plane, &self.rig.bind_group);
            }
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &target,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &output,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(bytes_per_row),
                        rows_per_image: Some(TARGET_SIZE),
                    },
                },
                size,
            );
            queue.submit(iter::once(encoder.finish()));

            let slice = output.slice(..);
            let (tx, rx) = futures::channel::oneshot::channel();
            slice.map_async(wgpu::MapMode::Read, move |result| {
                tx.send(result).unwrap();
            });
            device
                .poll(wgpu::PollType::Wait)
                .unwrap();
            futures::executor::block_on(rx).unwrap().unwrap();
            let data = slice.get_mapped_range().to_vec();
            image::RgbaImage::from_raw(TARGET_SIZE, TARGET_SIZE, data).unwrap()
        }
    }
}
