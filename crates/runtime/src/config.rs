//! Scene configuration.
//!
//! Every tunable the globe viewer uses at startup lives here with its default.
//! The click threshold, target region and redirect URL are not part of this:
//! they are fixed constants next to the code that uses them.

use serde::{Deserialize, Serialize};

const TEXTURE_BASE_URL: &str =
    "https://raw.githubusercontent.com/mrdoob/three.js/dev/examples/textures/planets";

/// Upper bound on sphere segments per axis. Keeps vertex and index counts
/// well inside `u32` and WebGL2 buffer limits.
pub const MAX_MESH_SEGMENTS: u32 = 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    Serialize(String),
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config is not valid JSON: {msg}"),
            ConfigError::Serialize(msg) => write!(f, "config could not be serialized: {msg}"),
            ConfigError::Invalid { field, reason } => write!(f, "config field `{field}` {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
    /// Initial distance from the globe center along +Z.
    pub distance: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub enable_damping: bool,
    /// Fraction of the pending rotation applied per update when damping.
    pub damping_factor: f64,
    pub rotate_speed: f64,
    pub zoom_speed: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 0.5,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeMeshConfig {
    pub radius: f64,
    pub width_segments: u32,
    pub height_segments: u32,
    /// Rotation about +Y added every animation frame, in radians.
    pub spin_per_frame_rad: f64,
}

impl Default for GlobeMeshConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 64,
            height_segments: 64,
            spin_per_frame_rad: 0.0005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub point_color: [f32; 3],
    pub point_intensity: f32,
    pub point_position: [f64; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.5,
            point_color: [1.0, 1.0, 1.0],
            point_intensity: 1.0,
            point_position: [5.0, 3.0, 5.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub bump_scale: f32,
    pub specular_color: [f32; 3],
    pub shininess: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            bump_scale: 0.05,
            specular_color: [0.5, 0.5, 0.5],
            shininess: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureUrls {
    pub color_map: String,
    pub bump_map: String,
    pub specular_map: String,
}

impl Default for TextureUrls {
    fn default() -> Self {
        Self {
            color_map: format!("{TEXTURE_BASE_URL}/earth_atmos_2048.jpg"),
            bump_map: format!("{TEXTURE_BASE_URL}/earth_normal_2048.jpg"),
            specular_map: format!("{TEXTURE_BASE_URL}/earth_specular_2048.jpg"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub globe: GlobeMeshConfig,
    pub lighting: LightingConfig,
    pub material: MaterialConfig,
    pub textures: TextureUrls,
    /// `tracing` filter directive, e.g. `"info"` or `"scene=debug,info"`.
    pub log_filter: String,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            orbit: OrbitConfig::default(),
            globe: GlobeMeshConfig::default(),
            lighting: LightingConfig::default(),
            material: MaterialConfig::default(),
            textures: TextureUrls::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl GlobeConfig {
    /// Parse a (possibly partial) JSON document; missing fields keep defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        if !(cam.fov_y_deg > 0.0 && cam.fov_y_deg < 180.0) {
            return Err(invalid("camera.fov_y_deg", "must be in (0, 180)"));
        }
        if !(cam.near > 0.0) {
            return Err(invalid("camera.near", "must be positive"));
        }
        if !(cam.far > cam.near) {
            return Err(invalid("camera.far", "must be greater than camera.near"));
        }
        if !(cam.distance > 0.0) {
            return Err(invalid("camera.distance", "must be positive"));
        }

        let orbit = &self.orbit;
        if !(orbit.damping_factor > 0.0 && orbit.damping_factor <= 1.0) {
            return Err(invalid("orbit.damping_factor", "must be in (0, 1]"));
        }
        if !(orbit.rotate_speed > 0.0) {
            return Err(invalid("orbit.rotate_speed", "must be positive"));
        }
        if !(orbit.zoom_speed > 0.0) {
            return Err(invalid("orbit.zoom_speed", "must be positive"));
        }
        if !(orbit.min_distance >= 0.0 && orbit.max_distance > orbit.min_distance) {
            return Err(invalid(
                "orbit.max_distance",
                "must be greater than a non-negative orbit.min_distance",
            ));
        }

        let globe = &self.globe;
        if !(globe.radius > 0.0) {
            return Err(invalid("globe.radius", "must be positive"));
        }
        if globe.width_segments < 3 || globe.height_segments < 2 {
            return Err(invalid(
                "globe.width_segments",
                "needs at least 3 width and 2 height segments",
            ));
        }
        if globe.width_segments > MAX_MESH_SEGMENTS {
            return Err(invalid(
                "globe.width_segments",
                &format!("must be at most {MAX_MESH_SEGMENTS}"),
            ));
        }
        if globe.height_segments > MAX_MESH_SEGMENTS {
            return Err(invalid(
                "globe.height_segments",
                &format!("must be at most {MAX_MESH_SEGMENTS}"),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
