use console_error_panic_hook::set_once;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use foundation::time::Millis;
use runtime::config::GlobeConfig;
use runtime::gesture::ScreenPoint;
use scene::{Navigator, Viewport};

mod app;
mod logging;
mod textures;
mod wgpu;

use app::GlobeApp;
use textures::{TextureKind, load_texture};
use wgpu::init_wgpu;

type SharedApp = Rc<RefCell<GlobeApp>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Navigates the current tab.
struct LocationNavigator;

impl Navigator for LocationNavigator {
    fn navigate(&mut self, url: &str) {
        let Some(window) = web_sys::window() else {
            tracing::warn!(url, "no window to navigate");
            return;
        };
        if let Err(err) = window.location().set_href(url) {
            tracing::warn!(url, "navigation failed: {err:?}");
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Build the scene with default settings and start rendering.
#[wasm_bindgen]
pub fn run() -> Result<(), JsValue> {
    launch(GlobeConfig::default())
}

/// Like [`run`], with a (possibly partial) JSON config. An unparsable or
/// out-of-range config falls back to the defaults.
#[wasm_bindgen]
pub fn run_with_config(json: &str) -> Result<(), JsValue> {
    match GlobeConfig::from_json(json) {
        Ok(config) => launch(config),
        Err(err) => {
            let config = GlobeConfig::default();
            logging::init(&config.log_filter);
            tracing::warn!("{err}; using default config");
            launch(config)
        }
    }
}

/// The default configuration as JSON, for hosts that want to tweak it.
#[wasm_bindgen]
pub fn default_config_json() -> Result<String, JsValue> {
    GlobeConfig::default()
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn launch(config: GlobeConfig) -> Result<(), JsValue> {
    logging::init(&config.log_filter);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("document missing"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("body missing"))?;

    body.style().set_property("margin", "0")?;
    body.style().set_property("overflow", "hidden")?;

    let canvas = document
        .create_element("canvas")?
        .dyn_into::<web_sys::HtmlCanvasElement>()?;
    let style = canvas.style();
    style.set_property("display", "block")?;
    style.set_property("position", "fixed")?;
    style.set_property("left", "0")?;
    style.set_property("top", "0")?;
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    body.append_child(&canvas)?;

    let (viewport, backing_w, backing_h) = measure_window(&window);
    canvas.set_width(backing_w);
    canvas.set_height(backing_h);

    let app: SharedApp = Rc::new(RefCell::new(GlobeApp::new(
        config,
        viewport,
        Box::new(LocationNavigator),
    )));
    tracing::info!(
        width = viewport.width_px,
        height = viewport.height_px,
        "globe starting"
    );

    install_pointer_listeners(&canvas, &app)?;
    install_resize_listener(&window, &canvas, &app)?;

    spawn_local(init_renderer(canvas, app.clone()));
    start_render_loop(app)
}

/// CSS viewport plus the backing-store size scaled by the device pixel ratio.
fn measure_window(window: &web_sys::Window) -> (Viewport, u32, u32) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1.0);
    let dpr = window.device_pixel_ratio().max(1e-3);
    (
        Viewport::new(width, height),
        backing_size(width, dpr),
        backing_size(height, dpr),
    )
}

fn backing_size(css_px: f64, device_pixel_ratio: f64) -> u32 {
    (css_px * device_pixel_ratio).round().max(1.0) as u32
}

fn pointer_position(event: &web_sys::MouseEvent) -> ScreenPoint {
    ScreenPoint::new(event.offset_x() as f64, event.offset_y() as f64)
}

fn attach<T: ?Sized + wasm_bindgen::closure::WasmClosure>(
    target: &web_sys::EventTarget,
    event: &str,
    closure: Closure<T>,
) -> Result<(), JsValue> {
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the page.
    closure.forget();
    Ok(())
}

fn install_pointer_listeners(
    canvas: &web_sys::HtmlCanvasElement,
    app: &SharedApp,
) -> Result<(), JsValue> {
    let target: &web_sys::EventTarget = canvas.as_ref();

    let a = app.clone();
    attach(
        target,
        "mousedown",
        Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
            a.borrow_mut()
                .on_mouse_down(Millis(js_sys::Date::now()), pointer_position(&ev));
        }),
    )?;

    let a = app.clone();
    attach(
        target,
        "mousemove",
        Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
            a.borrow_mut().on_mouse_move(pointer_position(&ev));
        }),
    )?;

    let a = app.clone();
    attach(
        target,
        "mouseup",
        Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
            a.borrow_mut()
                .on_mouse_up(Millis(js_sys::Date::now()), pointer_position(&ev));
        }),
    )?;

    let a = app.clone();
    attach(
        target,
        "mouseleave",
        Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
            a.borrow_mut().on_mouse_leave();
        }),
    )?;

    let a = app.clone();
    attach(
        target,
        "wheel",
        Closure::<dyn FnMut(web_sys::WheelEvent)>::new(move |ev: web_sys::WheelEvent| {
            ev.prevent_default();
            a.borrow_mut().on_wheel(ev.delta_y());
        }),
    )?;

    Ok(())
}

fn install_resize_listener(
    window: &web_sys::Window,
    canvas: &web_sys::HtmlCanvasElement,
    app: &SharedApp,
) -> Result<(), JsValue> {
    let a = app.clone();
    let canvas = canvas.clone();
    attach(
        window.as_ref(),
        "resize",
        Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (viewport, backing_w, backing_h) = measure_window(&window);
            canvas.set_width(backing_w);
            canvas.set_height(backing_h);
            a.borrow_mut().resize(viewport, backing_w, backing_h);
        }),
    )
}

async fn init_renderer(canvas: web_sys::HtmlCanvasElement, app: SharedApp) {
    let mesh = app.borrow().globe.mesh();
    let ctx = match init_wgpu(canvas.clone(), &mesh).await {
        Ok(ctx) => ctx,
        Err(err) => {
            tracing::error!("wgpu init error: {err:?}");
            return;
        }
    };

    {
        let mut a = app.borrow_mut();
        a.renderer = Some(ctx);
        // The window may have been resized while the device was pending.
        let viewport = a.viewport;
        a.resize(viewport, canvas.width(), canvas.height());
    }
    tracing::info!(vertices = mesh.vertices.len(), "renderer ready");

    let urls = app.borrow().config.textures.clone();
    for kind in TextureKind::ALL {
        let url = match kind {
            TextureKind::Color => urls.color_map.clone(),
            TextureKind::Bump => urls.bump_map.clone(),
            TextureKind::Specular => urls.specular_map.clone(),
        };
        let app = app.clone();
        spawn_local(async move {
            match load_texture(&url).await {
                Ok(image) => app.borrow_mut().apply_texture(kind, &image),
                Err(err) => tracing::warn!(kind = kind.label(), "{err}; keeping placeholder"),
            }
        });
    }
}

fn start_render_loop(app: SharedApp) -> Result<(), JsValue> {
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let next = callback.clone();

    *callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        {
            let mut a = app.borrow_mut();
            a.tick(Millis(timestamp));
            a.render();
        }
        if let Err(err) = request_frame(&next) {
            tracing::error!("render loop stopped: {err:?}");
        }
    }));

    request_frame(&callback)
}

fn request_frame(callback: &FrameCallback) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))?;
    if let Some(cb) = callback.borrow().as_ref() {
        window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }
    Ok(())
}
