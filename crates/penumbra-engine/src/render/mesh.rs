//! Indexed triangle meshes for the geometry pass.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// CPU-side mesh: parallel position/normal arrays plus CCW triangle indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Square in the XZ plane at `height`, facing +Y.
    pub fn ground_plane(half_extent: f32, height: f32) -> Self {
        let v = half_extent;
        Self {
            positions: vec![[-v, height, v], [-v, height, -v], [v, height, -v], [v, height, v]],
            normals: vec![[0.0, 1.0, 0.0]; 4],
            indices: vec![0, 2, 1, 0, 3, 2],
        }
    }

    /// Latitude/longitude sphere centered at the origin.
    ///
    /// `rings` is the number of latitude bands (>= 2), `sectors` the number of
    /// longitude slices (>= 3). Seam and pole vertices are duplicated.
    pub fn uv_sphere(radius: f32, rings: u32, sectors: u32) -> Self {
        let rings = rings.max(2);
        let sectors = sectors.max(3);

        let vertex_count = ((rings + 1) * (sectors + 1)) as usize;
        let mut positions = Vec::with_capacity(vertex_count);
        let mut normals = Vec::with_capacity(vertex_count);

        for i in 0..=rings {
            let theta = PI * i as f32 / rings as f32;
            let (sin_t, cos_t) = theta.sin_cos();
            for j in 0..=sectors {
                let phi = TAU * j as f32 / sectors as f32;
                let (sin_p, cos_p) = phi.sin_cos();
                let n = [sin_t * cos_p, cos_t, sin_t * sin_p];
                normals.push(n);
                positions.push([n[0] * radius, n[1] * radius, n[2] * radius]);
            }
        }

        let mut indices = Vec::with_capacity((rings * sectors * 6) as usize);
        for i in 0..rings {
            for j in 0..sectors {
                let a = i * (sectors + 1) + j;
                let b = a + sectors + 1;
                // Skip the degenerate halves at the poles.
                if i != 0 {
                    indices.extend_from_slice(&[a, a + 1, b]);
                }
                if i != rings - 1 {
                    indices.extend_from_slice(&[a + 1, b + 1, b]);
                }
            }
        }

        Self {
            positions,
            normals,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn interleaved(&self) -> Vec<MeshVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .map(|(&position, &normal)| MeshVertex { position, normal })
            .collect()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Device-resident mesh.
#[derive(Debug)]
pub struct Mesh {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    pub fn upload(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        debug_assert_eq!(data.positions.len(), data.normals.len());

        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vbo")),
            contents: bytemuck::cast_slice(&data.interleaved()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} ibo")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vbo,
            ibo,
            index_count: data.indices.len() as u32,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Binds the mesh buffers and issues one instanced indexed draw.
    pub fn draw_instances(&self, pass: &mut wgpu::RenderPass<'_>, instances: u32) {
        if instances == 0 || self.index_count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vbo.slice(..));
        pass.set_index_buffer(self.ibo.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn triangles(mesh: &MeshData) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        mesh.indices.chunks_exact(3).map(|t| {
            [
                Vec3::from(mesh.positions[t[0] as usize]),
                Vec3::from(mesh.positions[t[1] as usize]),
                Vec3::from(mesh.positions[t[2] as usize]),
            ]
        })
    }

    fn face_normal([a, b, c]: [Vec3; 3]) -> Vec3 {
        (b - a).cross(c - a)
    }

    #[test]
    fn ground_plane_faces_up() {
        let plane = MeshData::ground_plane(100.0, -0.1);
        assert_eq!(plane.indices.len(), 6);
        for tri in triangles(&plane) {
            let n = face_normal(tri);
            assert!(n.y > 0.0, "{n:?}");
            assert_eq!(tri[0].y, -0.1);
        }
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let sphere = MeshData::uv_sphere(2.0, 8, 12);
        assert_eq!(sphere.vertex_count(), 9 * 13);
        for (p, n) in sphere.positions.iter().zip(&sphere.normals) {
            let p = Vec3::from(*p);
            assert!((p.length() - 2.0).abs() < 1e-4);
            assert!((Vec3::from(*n) - p / 2.0).length() < 1e-5);
        }
    }

    #[test]
    fn sphere_triangles_wind_outward() {
        let sphere = MeshData::uv_sphere(1.0, 6, 8);
        for tri in triangles(&sphere) {
            let center = (tri[0] + tri[1] + tri[2]) / 3.0;
            assert!(face_normal(tri).dot(center) > 0.0);
        }
    }

    #[test]
    fn sphere_index_count_skips_pole_degenerates() {
        let (rings, sectors) = (6u32, 8u32);
        let sphere = MeshData::uv_sphere(1.0, rings, sectors);
        let expected = (rings - 1) * sectors * 6;
        assert_eq!(sphere.indices.len() as u32, expected);
        assert!(sphere.indices.iter().all(|&i| (i as usize) < sphere.vertex_count()));
    }

    #[test]
    fn interleaving_keeps_order() {
        let plane = MeshData::ground_plane(1.0, 0.0);
        let v = plane.interleaved();
        assert_eq!(v.len(), 4);
        assert_eq!(v[2].position, [1.0, 0.0, -1.0]);
        assert_eq!(v[2].normal, [0.0, 1.0, 0.0]);
        assert_eq!(std::mem::size_of::<MeshVertex>(), 24);
    }
}
