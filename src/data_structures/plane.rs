//! The unit plane the warp is drawn on.
//!
//! The mesh spans `[-0.5, 0.5]` on x and y at `z = 0`, facing `+z`. It is scaled to the
//! visible viewport by the camera transform, so a resize never rebuilds it.

use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneVertex {
    pub position: [f32; 3],
    /// Texture coordinate, origin at the top-left corner of the image.
    pub uv: [f32; 2],
}

impl PlaneVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<PlaneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Build a `segments` x `segments` grid with counter-clockwise triangles.
///
/// `segments` is clamped to at least 1 and at most 255 so every index fits a `u16`.
pub fn plane_mesh(segments: u32) -> (Vec<PlaneVertex>, Vec<u16>) {
    let n = segments.clamp(1, 255);
    let row = n + 1;
    let mut vertices = Vec::with_capacity((row * row) as usize);
    for r in 0..row {
        for c in 0..row {
            let s = c as f32 / n as f32;
            let t = r as f32 / n as f32;
            vertices.push(PlaneVertex {
                position: [s - 0.5, t - 0.5, 0.0],
                uv: [s, 1.0 - t],
            });
        }
    }

    let mut indices = Vec::with_capacity((n * n * 6) as usize);
    for r in 0..n {
        for c in 0..n {
            let bottom_left = (r * row + c) as u16;
            let bottom_right = bottom_left + 1;
            let top_left = bottom_left + row as u16;
            let top_right = top_left + 1;
            indices.extend_from_slice(&[
                bottom_left,
                bottom_right,
                top_right,
                bottom_left,
                top_right,
                top_left,
            ]);
        }
    }
    (vertices, indices)
}

#[derive(Debug)]
pub struct PlaneGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl PlaneGeometry {
    pub fn new(device: &wgpu::Device, segments: u32) -> Self {
        let (vertices, indices) = plane_mesh(segments);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plane Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plane Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }
}
