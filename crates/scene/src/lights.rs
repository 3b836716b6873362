use foundation::math::Vec3;
use runtime::config::LightingConfig;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Vec3,
}

/// The two lights illuminating the globe.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub point: PointLight,
}

impl Lighting {
    pub fn from_config(cfg: &LightingConfig) -> Self {
        let [x, y, z] = cfg.point_position;
        Self {
            ambient: AmbientLight {
                color: cfg.ambient_color,
                intensity: cfg.ambient_intensity,
            },
            point: PointLight {
                color: cfg.point_color,
                intensity: cfg.point_intensity,
                position: Vec3::new(x, y, z),
            },
        }
    }

    /// Ambient color premultiplied by intensity.
    pub fn ambient_radiance(&self) -> [f32; 3] {
        scale_rgb(self.ambient.color, self.ambient.intensity)
    }

    pub fn point_radiance(&self) -> [f32; 3] {
        scale_rgb(self.point.color, self.point.intensity)
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self::from_config(&LightingConfig::default())
    }
}

fn scale_rgb(rgb: [f32; 3], s: f32) -> [f32; 3] {
    [rgb[0] * s, rgb[1] * s, rgb[2] * s]
}
