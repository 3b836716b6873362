//! The scene context shared by every browser callback.

use foundation::time::Millis;
use runtime::config::GlobeConfig;
use runtime::frame::Frame;
use runtime::gesture::{ClickClassifier, PointerEvent, ScreenPoint};
use scene::click::handle_click;
use scene::{ClickOutcome, Globe, Lighting, Navigator, OrbitControls, PerspectiveCamera, Viewport};

use crate::textures::{RgbaImage, TextureKind};
use crate::wgpu::{Globals, WgpuContext, render_globe, resize_wgpu, set_texture};

/// Frame gaps longer than this (hidden tab, debugger pause) are logged.
const FRAME_STALL_MS: f64 = 250.0;

pub struct GlobeApp {
    pub config: GlobeConfig,
    pub camera: PerspectiveCamera,
    pub globe: Globe,
    pub lighting: Lighting,
    pub orbit: OrbitControls,
    pub classifier: ClickClassifier,
    /// CSS pixel size; pointer coordinates are in the same space.
    pub viewport: Viewport,
    pub frame: Option<Frame>,
    pub renderer: Option<WgpuContext>,
    navigator: Box<dyn Navigator>,
}

impl GlobeApp {
    pub fn new(config: GlobeConfig, viewport: Viewport, navigator: Box<dyn Navigator>) -> Self {
        let camera = PerspectiveCamera::from_config(&config.camera, viewport.aspect());
        let globe = Globe::from_config(&config.globe);
        let lighting = Lighting::from_config(&config.lighting);
        let mut orbit = OrbitControls::new(config.orbit.clone());
        orbit.set_viewport_height(viewport.height_px);

        Self {
            config,
            camera,
            globe,
            lighting,
            orbit,
            classifier: ClickClassifier::default(),
            viewport,
            frame: None,
            renderer: None,
            navigator,
        }
    }

    pub fn on_mouse_down(&mut self, at: Millis, position: ScreenPoint) {
        self.classifier.handle(PointerEvent::Press { at });
        self.orbit.on_pointer_down(position);
    }

    pub fn on_mouse_move(&mut self, position: ScreenPoint) {
        if self.classifier.is_pressed() {
            self.classifier.handle(PointerEvent::Move);
        }
        self.orbit.on_pointer_move(position);
    }

    /// Ends any orbit drag; returns the click outcome when the release
    /// qualified as a click.
    pub fn on_mouse_up(&mut self, at: Millis, position: ScreenPoint) -> Option<ClickOutcome> {
        self.orbit.on_pointer_up();
        let click = self
            .classifier
            .handle(PointerEvent::Release { at, position })?;
        Some(handle_click(
            click,
            self.viewport,
            &self.camera,
            &self.globe,
            self.navigator.as_mut(),
        ))
    }

    pub fn on_mouse_leave(&mut self) {
        if self.orbit.is_rotating() {
            tracing::debug!("pointer left the canvas mid-drag");
            self.orbit.on_pointer_up();
        }
    }

    pub fn on_wheel(&mut self, delta_y: f64) {
        self.orbit.on_wheel(delta_y);
    }

    /// New CSS size and backing-store size (CSS size times device pixel ratio).
    pub fn resize(&mut self, viewport: Viewport, backing_width: u32, backing_height: u32) {
        self.viewport = viewport;
        self.camera
            .set_viewport(viewport.width_px, viewport.height_px);
        self.orbit.set_viewport_height(viewport.height_px);
        if let Some(ctx) = self.renderer.as_mut() {
            resize_wgpu(ctx, backing_width, backing_height);
        }
        tracing::debug!(
            width = viewport.width_px,
            height = viewport.height_px,
            backing_width,
            backing_height,
            "viewport resized"
        );
    }

    /// Per-frame update: spin the globe, then let the orbit controls move
    /// the camera.
    pub fn tick(&mut self, now: Millis) -> Frame {
        let frame = match self.frame {
            Some(prev) => {
                let next = prev.next(now);
                let gap_ms = next.delta_ms(prev);
                if gap_ms > FRAME_STALL_MS {
                    tracing::debug!(
                        frame = next.index,
                        gap_ms,
                        "animation frames resumed after a stall"
                    );
                }
                next
            }
            None => Frame::first(now),
        };
        self.frame = Some(frame);

        self.globe.spin();
        self.orbit.update(&mut self.camera);
        frame
    }

    pub fn globals(&self) -> Globals {
        Globals::new(
            &self.camera,
            &self.globe,
            &self.lighting,
            &self.config.material,
        )
    }

    pub fn render(&self) {
        let Some(ctx) = self.renderer.as_ref() else {
            return;
        };
        if let Err(err) = render_globe(ctx, &self.globals()) {
            tracing::warn!("render failed: {err:?}");
        }
    }

    pub fn apply_texture(&mut self, kind: TextureKind, image: &RgbaImage) {
        match self.renderer.as_mut() {
            Some(ctx) => {
                set_texture(ctx, kind, image);
                tracing::info!(
                    kind = kind.label(),
                    width = image.width,
                    height = image.height,
                    "texture uploaded"
                );
            }
            None => tracing::warn!(kind = kind.label(), "texture ready before renderer, dropped"),
        }
    }
}
