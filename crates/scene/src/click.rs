//! Click pipeline: screen position to globe hit, geographic position, region
//! test and, when the click lands inside the target region, navigation.

use foundation::bounds::GeoRect;
use foundation::math::{GeoPoint, Vec2, Vec3};
use runtime::gesture::{Click, ScreenPoint};

use crate::camera::PerspectiveCamera;
use crate::globe::Globe;
use crate::picking::{PickOptions, pick_screen};

/// Clicks inside this rectangle trigger navigation.
pub const TARGET_REGION: GeoRect = GeoRect::new(33.0, 43.0, -30.0, -20.0);

/// Destination of a click inside [`TARGET_REGION`].
pub const REDIRECT_URL: &str = "http://localhost:3000";

/// Seam for the page navigation side effect.
pub trait Navigator {
    fn navigate(&mut self, url: &str);
}

/// Drawing surface size in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width_px: f64,
    pub height_px: f64,
}

impl Viewport {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width_px > 0.0 && self.height_px > 0.0)
    }

    pub fn aspect(&self) -> f64 {
        if self.is_degenerate() {
            1.0
        } else {
            self.width_px / self.height_px
        }
    }

    /// Pixel position to normalized device coordinates (+Y up).
    pub fn to_ndc(&self, position: ScreenPoint) -> Option<Vec2> {
        if self.is_degenerate() {
            return None;
        }
        Some(Vec2::new(
            (position.x_px / self.width_px) * 2.0 - 1.0,
            -(position.y_px / self.height_px) * 2.0 + 1.0,
        ))
    }
}

/// World-space point where a ray through `position` first meets the globe.
pub fn hit_test(
    position: ScreenPoint,
    viewport: Viewport,
    camera: &PerspectiveCamera,
    globe: &Globe,
) -> Option<Vec3> {
    pick_screen(
        globe,
        position.x_px,
        position.y_px,
        |x_px, y_px| {
            let ndc = viewport.to_ndc(ScreenPoint::new(x_px, y_px))?;
            camera.ray_through_ndc(ndc)
        },
        PickOptions::default(),
    )
    .map(|hit| hit.point)
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ClickOutcome {
    /// The click did not land on the globe.
    Miss,
    Outside(GeoPoint),
    /// Inside [`TARGET_REGION`]; navigation was requested.
    Inside(GeoPoint),
}

/// Run a classified click through hit testing and the region check.
pub fn handle_click(
    click: Click,
    viewport: Viewport,
    camera: &PerspectiveCamera,
    globe: &Globe,
    navigator: &mut dyn Navigator,
) -> ClickOutcome {
    let Some(point) = hit_test(click.position, viewport, camera, globe) else {
        tracing::info!(
            x = click.position.x_px,
            y = click.position.y_px,
            "click missed the globe"
        );
        return ClickOutcome::Miss;
    };
    let Some(geo) = GeoPoint::from_unit(point - globe.center) else {
        return ClickOutcome::Miss;
    };

    tracing::info!("Clicked at {geo}");
    if TARGET_REGION.contains(geo) {
        tracing::info!(url = REDIRECT_URL, "click inside target region, navigating");
        navigator.navigate(REDIRECT_URL);
        ClickOutcome::Inside(geo)
    } else {
        tracing::info!("click outside target region");
        ClickOutcome::Outside(geo)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ClickOutcome, Navigator, REDIRECT_URL, TARGET_REGION, Viewport, handle_click, hit_test,
    };
    use crate::camera::PerspectiveCamera;
    use crate::globe::Globe;
    use foundation::math::{GeoPoint, Vec3};
    use runtime::config::CameraConfig;
    use runtime::gesture::{Click, ScreenPoint};
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Vec<String>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&mut self, url: &str) {
            self.visited.push(url.to_string());
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    /// Camera two units out, looking straight down at `geo`.
    fn camera_over(geo: GeoPoint) -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::from_config(&CameraConfig::default(), viewport().aspect());
        cam.position = geo.to_unit().scale(2.0);
        cam
    }

    fn center_click() -> Click {
        Click {
            position: ScreenPoint::new(400.0, 300.0),
            duration_ms: 50.0,
        }
    }

    #[test]
    fn ndc_corners() {
        let vp = viewport();
        let tl = vp.to_ndc(ScreenPoint::new(0.0, 0.0)).expect("ndc");
        let br = vp.to_ndc(ScreenPoint::new(800.0, 600.0)).expect("ndc");
        assert_eq!((tl.x, tl.y), (-1.0, 1.0));
        assert_eq!((br.x, br.y), (1.0, -1.0));
    }

    #[test]
    fn degenerate_viewport_is_no_hit() {
        let cam = PerspectiveCamera::from_config(&CameraConfig::default(), 1.0);
        let vp = Viewport::new(0.0, 600.0);
        assert_eq!(vp.to_ndc(ScreenPoint::new(0.0, 0.0)), None);
        assert_eq!(hit_test(ScreenPoint::new(0.0, 0.0), vp, &cam, &Globe::unit()), None);
    }

    #[test]
    fn default_camera_center_hits_front_of_globe() {
        let cam = PerspectiveCamera::from_config(&CameraConfig::default(), viewport().aspect());
        let hit = hit_test(ScreenPoint::new(400.0, 300.0), viewport(), &cam, &Globe::unit())
            .expect("hit");
        assert!((hit - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-9);
    }

    #[test]
    fn click_in_region_navigates_once() {
        let cam = camera_over(TARGET_REGION.center());
        let mut nav = RecordingNavigator::default();

        let outcome = handle_click(center_click(), viewport(), &cam, &Globe::unit(), &mut nav);

        let ClickOutcome::Inside(geo) = outcome else {
            panic!("expected a click inside the region, got {outcome:?}");
        };
        assert!((geo.lat_deg - 38.0).abs() < 1e-6);
        assert!((geo.lon_deg + 25.0).abs() < 1e-6);
        assert_eq!(nav.visited, vec![REDIRECT_URL.to_string()]);
    }

    #[test]
    fn spun_globe_keeps_region_fixed_in_world_space() {
        let cam = camera_over(TARGET_REGION.center());
        let mut globe = Globe::unit();
        globe.rotation_y_rad = 1.0;
        let mut nav = RecordingNavigator::default();

        let outcome = handle_click(center_click(), viewport(), &cam, &globe, &mut nav);

        let ClickOutcome::Inside(geo) = outcome else {
            panic!("expected a click inside the region, got {outcome:?}");
        };
        assert!((geo.lon_deg + 25.0).abs() < 1e-6);
        assert_eq!(nav.visited, vec![REDIRECT_URL.to_string()]);
    }

    #[test]
    fn click_outside_region_never_navigates() {
        let cam = camera_over(GeoPoint::new(0.0, 0.0));
        let mut nav = RecordingNavigator::default();

        let outcome = handle_click(center_click(), viewport(), &cam, &Globe::unit(), &mut nav);

        assert!(matches!(outcome, ClickOutcome::Outside(_)));
        assert!(nav.visited.is_empty());
    }

    #[test]
    fn miss_neither_converts_nor_navigates() {
        let mut cam = camera_over(TARGET_REGION.center());
        // Look away from the globe.
        cam.target = cam.position.scale(2.0);
        let mut nav = RecordingNavigator::default();

        let outcome = handle_click(center_click(), viewport(), &cam, &Globe::unit(), &mut nav);

        assert_eq!(outcome, ClickOutcome::Miss);
        assert!(nav.visited.is_empty());
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log lock").extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn miss_is_reported_at_default_log_level() {
        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("info"))
            .with_writer(log.clone())
            .without_time()
            .with_ansi(false)
            .finish();

        let mut cam = camera_over(TARGET_REGION.center());
        cam.target = cam.position.scale(2.0);
        let mut nav = RecordingNavigator::default();
        let outcome = tracing::subscriber::with_default(subscriber, || {
            handle_click(center_click(), viewport(), &cam, &Globe::unit(), &mut nav)
        });

        assert_eq!(outcome, ClickOutcome::Miss);
        let text = String::from_utf8(log.0.lock().expect("log lock").clone()).expect("utf8");
        assert!(text.contains("click missed the globe"), "log was: {text}");
    }

    #[test]
    fn click_off_the_limb_misses() {
        let cam = PerspectiveCamera::from_config(&CameraConfig::default(), viewport().aspect());
        let mut nav = RecordingNavigator::default();
        let corner = Click {
            position: ScreenPoint::new(0.0, 0.0),
            duration_ms: 10.0,
        };
        let outcome = handle_click(corner, viewport(), &cam, &Globe::unit(), &mut nav);
        assert_eq!(outcome, ClickOutcome::Miss);
    }
}
