use bytemuck::NoUninit;
use glam::Vec3;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

// Quad faces of an axis-aligned box as (normal, tangent, bitangent), with
// tangent x bitangent = normal so corners wind counter-clockwise seen from
// outside.
const BOX_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
];

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Append an axis-aligned box centered at `center`.
    pub fn push_cuboid(&mut self, center: Vec3, half_extents: Vec3, color: [f32; 4]) {
        for (normal, tangent, bitangent) in BOX_FACES {
            let n = Vec3::from(normal);
            let t = Vec3::from(tangent);
            let b = Vec3::from(bitangent);
            let base = self.vertices.len() as u32;

            let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
            let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
            for ((su, sv), uv) in corners.into_iter().zip(uvs) {
                let pos = center + (n + t * su + b * sv) * half_extents;
                self.vertices.push(Vertex {
                    pos: pos.to_array(),
                    normal,
                    color,
                    uv,
                });
            }
            self.indices
                .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    /// Append a UV sphere centered at `center`.
    pub fn push_sphere(
        &mut self,
        center: Vec3,
        radius: f32,
        rings: u32,
        segments: u32,
        color: [f32; 4],
    ) {
        let base = self.vertices.len() as u32;
        for ring in 0..=rings {
            let theta = std::f32::consts::PI * ring as f32 / rings as f32;
            for segment in 0..=segments {
                let phi = std::f32::consts::TAU * segment as f32 / segments as f32;
                let dir = Vec3::new(
                    theta.sin() * phi.cos(),
                    theta.cos(),
                    theta.sin() * phi.sin(),
                );
                self.vertices.push(Vertex {
                    pos: (center + dir * radius).to_array(),
                    normal: dir.to_array(),
                    color,
                    uv: [
                        segment as f32 / segments as f32,
                        ring as f32 / rings as f32,
                    ],
                });
            }
        }
        for ring in 0..rings {
            for segment in 0..segments {
                let i0 = base + ring * (segments + 1) + segment;
                let i1 = i0 + segments + 1;
                self.indices.extend([i0, i0 + 1, i1, i1, i0 + 1, i1 + 1]);
            }
        }
    }

    /// Append a flat square of side length `size` centered on the origin at
    /// height `y`, facing up.
    pub fn push_ground_plane(&mut self, size: f32, y: f32, color: [f32; 4]) {
        let s = size / 2.0;
        let base = self.vertices.len() as u32;
        let corners = [
            ([-s, y, -s], [0.0, 0.0]),
            ([-s, y, s], [0.0, 1.0]),
            ([s, y, s], [1.0, 1.0]),
            ([s, y, -s], [1.0, 0.0]),
        ];
        for (pos, uv) in corners {
            self.vertices.push(Vertex {
                pos,
                normal: [0.0, 1.0, 0.0],
                color,
                uv,
            });
        }
        self.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_has_six_quad_faces() {
        let mut mesh = Mesh::empty();
        mesh.push_cuboid(Vec3::ZERO, Vec3::splat(0.5), [1.0; 4]);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn cuboid_corners_span_the_half_extents() {
        let mut mesh = Mesh::empty();
        mesh.push_cuboid(Vec3::new(5.0, 1.0, -5.0), Vec3::splat(1.0), [1.0; 4]);
        for vertex in &mesh.vertices {
            assert!((vertex.pos[0] - 5.0).abs() <= 1.0 + 1e-6);
            assert!((vertex.pos[1] - 1.0).abs() <= 1.0 + 1e-6);
            assert!((vertex.pos[2] + 5.0).abs() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn sphere_vertices_sit_on_the_radius() {
        let mut mesh = Mesh::empty();
        let center = Vec3::new(1.0, 2.0, 3.0);
        mesh.push_sphere(center, 0.2, 8, 16, [1.0; 4]);
        for vertex in &mesh.vertices {
            let distance = (Vec3::from(vertex.pos) - center).length();
            assert!((distance - 0.2).abs() < 1e-5);
        }
    }
}
