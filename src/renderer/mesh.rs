use glam::{Vec2, Vec3};

/// CPU-side geometry, uploaded once through `Gpu::upload_mesh`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    /// Indices drawn for indexed meshes, vertices otherwise.
    pub fn draw_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.positions.len(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.draw_count() / 3
    }
}

/// Flat grid on the XZ plane facing +Y, centred on the origin. UVs repeat
/// `uv_repeat` times across each axis.
pub fn create_xz_plane(
    width: f32,
    depth: f32,
    x_divisions: u32,
    z_divisions: u32,
    uv_repeat: f32,
) -> MeshData {
    let mut mesh = MeshData::default();
    let half_width = width * 0.5;
    let half_depth = depth * 0.5;
    let x_step = width / x_divisions as f32;
    let z_step = depth / z_divisions as f32;

    for zi in 0..=z_divisions {
        let z = -half_depth + zi as f32 * z_step;
        for xi in 0..=x_divisions {
            let x = -half_width + xi as f32 * x_step;
            mesh.positions.push(Vec3::new(x, 0.0, z));
            mesh.normals.push(Vec3::Y);
            mesh.uvs
                .push(Vec2::new(x / width * uv_repeat, z / depth * uv_repeat));
        }
    }

    let row = x_divisions + 1;
    let mut indices = Vec::with_capacity((x_divisions * z_divisions * 6) as usize);
    for zi in 0..z_divisions {
        let row0 = zi * row;
        let row1 = row0 + row;
        for xi in 0..x_divisions {
            let a = row0 + xi;
            let b = row1 + xi;
            // Counter-clockwise seen from above, so back-face culling keeps it.
            indices.extend_from_slice(&[a + 1, a, b, a + 1, b, b + 1]);
        }
    }
    mesh.indices = Some(indices);
    mesh
}
