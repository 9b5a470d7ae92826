//! Fixed perspective camera and the transform that stretches the plane over the viewport.
//!
//! The camera sits on the `+z` axis looking at the origin and never moves. Each resize
//! recomputes the projection and the plane's scale, which together yield one
//! model-view-projection matrix in a small uniform buffer. None of this touches the
//! warp uniforms.

use cgmath::{Deg, EuclideanSpace, Matrix4, Point3, Rad, Vector3};
use wgpu::util::DeviceExt;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Point3<f32>,
}

impl Camera {
    pub fn new(distance: f32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, distance),
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, Point3::origin(), Vector3::unit_y())
    }

    /// Distance to the plane at `z = 0`.
    pub fn distance(&self) -> f32 {
        self.position.z
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    /// World-space width and height visible at `distance` in front of the camera.
    pub fn visible_extent(&self, distance: f32) -> (f32, f32) {
        let height = 2.0 * distance * (self.fovy.0 / 2.0).tan();
        (height * self.aspect, height)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    mvp: [[f32; 4]; 4],
}

impl TransformUniform {
    /// Plane scaled to exactly cover the view, seen through `camera`.
    pub fn viewport_filling(camera: &Camera, projection: &Projection) -> Self {
        let (width, height) = projection.visible_extent(camera.distance());
        let model = Matrix4::from_nonuniform_scale(width, height, 1.0);
        Self {
            mvp: (projection.calc_matrix() * camera.view_matrix() * model).into(),
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        self.mvp.into()
    }
}

/// Camera state plus the GPU buffer and bind group that carry the transform.
#[derive(Debug)]
pub struct CameraRig {
    pub camera: Camera,
    pub projection: Projection,
    pub uniform: TransformUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraRig {
    pub fn new(device: &wgpu::Device, size: [u32; 2], fov: Deg<f32>, distance: f32) -> Self {
        let camera = Camera::new(distance);
        let projection = Projection::new(size[0], size[1], fov, 0.1, 100.0);
        let uniform = TransformUniform::viewport_filling(&camera, &projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("transform_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("transform_bind_group"),
        });

        Self {
            camera,
            projection,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        self.projection.resize(width, height);
        self.uniform = TransformUniform::viewport_filling(&self.camera, &self.projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
