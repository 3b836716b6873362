use foundation::math::{Mat4, Vec3, mat4_mul, mat4_rotation_y};
use runtime::config::{GlobeMeshConfig, MAX_MESH_SEGMENTS};

/// The textured earth sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct Globe {
    pub center: Vec3,
    pub radius: f64,
    /// Accumulated spin about +Y, in radians.
    pub rotation_y_rad: f64,
    pub spin_per_frame_rad: f64,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Globe {
    pub fn from_config(cfg: &GlobeMeshConfig) -> Self {
        Self {
            center: Vec3::ZERO,
            radius: cfg.radius,
            rotation_y_rad: 0.0,
            spin_per_frame_rad: cfg.spin_per_frame_rad,
            width_segments: cfg.width_segments,
            height_segments: cfg.height_segments,
        }
    }

    pub fn unit() -> Self {
        Self::from_config(&GlobeMeshConfig::default())
    }

    /// Advance the idle spin by one frame.
    pub fn spin(&mut self) {
        self.rotation_y_rad += self.spin_per_frame_rad;
    }

    /// Object-to-world transform: scale by radius, spin about Y, then translate.
    pub fn model_matrix(&self) -> Mat4 {
        let r = self.radius as f32;
        let scale = [
            [r, 0.0, 0.0, 0.0],
            [0.0, r, 0.0, 0.0],
            [0.0, 0.0, r, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let mut m = mat4_mul(mat4_rotation_y(self.rotation_y_rad), scale);
        m[3] = [
            self.center.x as f32,
            self.center.y as f32,
            self.center.z as f32,
            1.0,
        ];
        m
    }

    pub fn mesh(&self) -> SphereMesh {
        SphereMesh::generate(self.width_segments, self.height_segments)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Texture coordinate with `v = 0` on the north pole (image top row).
    pub uv: [f32; 2],
}

/// Unit UV-sphere in object space.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Rings run from the north pole (+Y) to the south pole. Each ring starts
    /// on -X and winds through +Z, which is the layout the geo conversion's
    /// longitude offset is calibrated against.
    pub fn generate(width_segments: u32, height_segments: u32) -> Self {
        // Clamped so every vertex index below fits in `u32`.
        let width = width_segments.clamp(3, MAX_MESH_SEGMENTS) as usize;
        let height = height_segments.clamp(2, MAX_MESH_SEGMENTS) as usize;
        let stride = width + 1;

        let mut vertices = Vec::with_capacity(stride * (height + 1));
        for iy in 0..=height {
            let v = iy as f32 / height as f32;
            let theta = v * std::f32::consts::PI;
            let (sin_t, cos_t) = theta.sin_cos();

            // Pole rows collapse to a point; shift their u by half a cell so
            // each pole triangle samples the middle of its column.
            let u_offset = if iy == 0 {
                0.5 / width as f32
            } else if iy == height {
                -0.5 / width as f32
            } else {
                0.0
            };

            for ix in 0..=width {
                let u = ix as f32 / width as f32;
                let phi = u * std::f32::consts::TAU;
                let (sin_p, cos_p) = phi.sin_cos();

                let x = -cos_p * sin_t;
                let y = cos_t;
                let z = sin_p * sin_t;
                vertices.push(SphereVertex {
                    position: [x, y, z],
                    normal: [x, y, z],
                    uv: [u + u_offset, v],
                });
            }
        }

        let index = |row: usize, col: usize| (row * stride + col) as u32;
        let mut indices = Vec::with_capacity(width * height * 6);
        for iy in 0..height {
            for ix in 0..width {
                let a = index(iy, ix + 1);
                let b = index(iy, ix);
                let c = index(iy + 1, ix);
                let d = index(iy + 1, ix + 1);

                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }
}
