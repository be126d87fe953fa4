// mesh.rs: inward-facing UV sphere the panorama is projected onto

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl SphereVertex {
    pub const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

/// Sphere seen from its centre.
///
/// `u` runs with longitude so the equirectangular image reads unmirrored
/// from inside; `v = 0` is the top row (north pole), matching wgpu texture
/// coordinates.
pub fn build_sphere(radius: f32, width_segments: usize, height_segments: usize) -> SphereMesh {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut vertices = Vec::with_capacity((height_segments + 1) * (width_segments + 1));
    let mut indices = Vec::with_capacity(height_segments * width_segments * 6);

    for i in 0..=height_segments {
        let v = i as f32 / height_segments as f32;
        let theta = std::f32::consts::PI * v;
        let (sin_t, cos_t) = theta.sin_cos();

        for j in 0..=width_segments {
            let u = j as f32 / width_segments as f32;
            let phi = 2.0 * std::f32::consts::PI * u;
            let (sin_p, cos_p) = phi.sin_cos();

            vertices.push(SphereVertex {
                position: [radius * cos_p * sin_t, radius * cos_t, radius * sin_p * sin_t],
                uv: [u, v],
            });
        }
    }

    let row = (width_segments + 1) as u32;
    for i in 0..height_segments as u32 {
        for j in 0..width_segments as u32 {
            let a = i * row + j;
            let b = a + row;
            // Pole rows collapse to points; skip their degenerate halves.
            if i != 0 {
                indices.extend_from_slice(&[a, a + 1, b]);
            }
            if i != height_segments as u32 - 1 {
                indices.extend_from_slice(&[b, a + 1, b + 1]);
            }
        }
    }

    SphereMesh { vertices, indices }
}
