pub mod camera;
pub mod click;
pub mod globe;
pub mod lights;
pub mod orbit;
pub mod picking;

pub use camera::PerspectiveCamera;
pub use click::{ClickOutcome, Navigator, REDIRECT_URL, TARGET_REGION, Viewport};
pub use globe::{Globe, SphereMesh, SphereVertex};
pub use lights::Lighting;
pub use orbit::OrbitControls;
