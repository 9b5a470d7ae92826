//! The warp shader program: pipeline, uniform buffer and texture binding.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        params::ParameterSet,
        plane::{PlaneGeometry, PlaneVertex},
        texture::Texture,
        uniforms::ShaderUniformSet,
    },
    error::ShaderCompileError,
};

pub const WARP_SHADER_LABEL: &str = "warp.wgsl";
pub const WARP_SHADER_SOURCE: &str = include_str!("warp.wgsl");

/// Parse and validate WGSL before handing it to the device.
///
/// wgpu reports shader errors asynchronously through the device's error handler, which
/// would leave a scene holding a broken pipeline. Checking up front lets the scene refuse
/// to render instead.
pub fn validate_wgsl(label: &str, source: &str) -> Result<(), ShaderCompileError> {
    use wgpu::naga;

    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderCompileError::Parse {
        label: label.to_string(),
        message: e.emit_to_string(source),
    })?;
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| ShaderCompileError::Validation {
        label: label.to_string(),
        message: e.emit_to_string(source),
    })?;
    Ok(())
}

pub fn warp_uniform_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("warp_uniform_bind_group_layout"),
    })
}

pub fn source_texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("source_texture_bind_group_layout"),
    })
}

/// A compiled warp pipeline together with the uniform set it owns.
///
/// Scalars are rewritten into the same buffer every frame; the texture bind group is built
/// once, for the first texture the uniform set binds, and never replaced.
#[derive(Debug)]
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    uniforms: ShaderUniformSet,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    texture_bind_group: Option<wgpu::BindGroup>,
}

impl ShaderProgram {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        transform_layout: &wgpu::BindGroupLayout,
        params: &ParameterSet,
    ) -> Result<Self, ShaderCompileError> {
        validate_wgsl(WARP_SHADER_LABEL, WARP_SHADER_SOURCE)?;

        let uniforms = ShaderUniformSet::new(params);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Warp Uniform Buffer"),
            contents: bytemuck::cast_slice(&[*uniforms.raw()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_layout = warp_uniform_layout(device);
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("warp_uniform_bind_group"),
        });
        let texture_layout = source_texture_layout(device);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Warp Pipeline Layout"),
            bind_group_layouts: &[transform_layout, &uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(WARP_SHADER_LABEL),
            source: wgpu::ShaderSource::Wgsl(WARP_SHADER_SOURCE.into()),
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            cache: None,
            label: Some("Warp Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[PlaneVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            // a single plane, nothing to depth-sort
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        Ok(Self {
            pipeline,
            uniforms,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
            texture_bind_group: None,
        })
    }

    pub fn uniforms(&self) -> &ShaderUniformSet {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut ShaderUniformSet {
        &mut self.uniforms
    }

    /// Copy the scalar uniforms into their GPU buffer.
    pub fn upload(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[*self.uniforms.raw()]),
        );
    }

    /// Build the texture bind group for `texture`, if it is the one the uniform set bound.
    pub fn bind_texture(&mut self, device: &wgpu::Device, texture: &Texture) {
        if self.texture_bind_group.is_some() || self.uniforms.texture() != Some(texture.source) {
            return;
        }
        self.texture_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some("source_texture_bind_group"),
        }));
    }

    pub fn is_textured(&self) -> bool {
        self.texture_bind_group.is_some()
    }

    /// Record the draw. Does nothing until a texture is bound.
    pub fn draw<'pass>(
        &self,
        render_pass: &mut wgpu::RenderPass<'pass>,
        plane: &PlaneGeometry,
        transform_bind_group: &wgpu::BindGroup,
    ) {
        let Some(texture_bind_group) = &self.texture_bind_group else {
            return;
        };
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, transform_bind_group, &[]);
        render_pass.set_bind_group(1, &self.uniform_bind_group, &[]);
        render_pass.set_bind_group(2, texture_bind_group, &[]);
        render_pass.set_vertex_buffer(0, plane.vertex_buffer.slice(..));
        render_pass.set_index_buffer(plane.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..plane.num_indices, 0, 0..1);
    }
}
