//! Browser host
//!
//! Mounts a membrane on every `[data-jelly]` element. The element becomes the
//! wrapper: a clipped blob `div` is painted beneath its content and an SVG
//! outline is laid over it, both expanded by the bleed on every side.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, EventTarget, HtmlElement, PointerEvent, ResizeObserver, ResizeObserverEntry,
};

use crate::config::JellyConfig;
use crate::error::JellyError;
use crate::frame::{Jelly, content_size};
use crate::platform::styles;
use crate::renderer::RenderSink;
use crate::sim::CornerRadii;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// Config JSON lives in this attribute (may be empty)
pub const CONFIG_ATTR: &str = "data-jelly";
/// Classes for the blob (background, border radius)
pub const BLOB_CLASS_ATTR: &str = "data-jelly-class";
const CLIP_PROBE: &str = "path(\"M 0 0 L 1 0 L 1 1 L 0 1 Z\")";

fn host_err(what: &str, err: JsValue) -> JellyError {
    JellyError::Host(format!("{what}: {err:?}"))
}

/// Writes each frame's path into the DOM
struct DomSink {
    blob: HtmlElement,
    outline: Option<Element>,
}

impl RenderSink for DomSink {
    fn set_clip_path(&mut self, d: &str) {
        let _ = self.blob.style().set_property("clip-path", &format!("path(\"{d}\")"));
    }

    fn set_outline_path(&mut self, d: &str) {
        if let Some(path) = &self.outline {
            let _ = path.set_attribute("d", d);
        }
    }
}

struct Instance {
    jelly: Jelly,
    sink: DomSink,
    wrap: HtmlElement,
    svg: Option<Element>,
}

impl Instance {
    /// Host-local pointer coordinates
    fn local(&self, e: &PointerEvent) -> (f32, f32) {
        let rect = self.wrap.get_bounding_client_rect();
        (
            (e.client_x() as f64 - rect.left()) as f32,
            (e.client_y() as f64 - rect.top()) as f32,
        )
    }

    fn remeasure(&mut self, width: f64, height: f64) {
        let (w, h) = content_size(width as f32, height as f32);
        if !self.jelly.needs_rebuild(w, h) {
            return;
        }
        let radii = read_corner_radii(&self.sink.blob, w as f32, h as f32);
        self.jelly.rebuild(w, h, radii);
        if let Err(err) = self.apply_layout() {
            log::warn!("Jelly layout update failed: {err}");
        }
        self.jelly.render(&mut self.sink);
    }

    /// Position blob and outline over the bleed-expanded render box
    fn apply_layout(&self) -> Result<(), JellyError> {
        let Some(size) = self.jelly.render_size() else {
            return Ok(());
        };
        let pad = self.jelly.bleed();
        let style = self.sink.blob.style();
        for (prop, value) in styles::blob_styles(pad, size) {
            style
                .set_property(prop, &value)
                .map_err(|e| host_err("blob style", e))?;
        }

        if let Some(svg) = &self.svg {
            svg.set_attribute("style", &styles::outline_style(pad, size))
                .map_err(|e| host_err("svg style", e))?;
            svg.set_attribute("viewBox", &format!("0 0 {} {}", size.x, size.y))
                .map_err(|e| host_err("svg viewBox", e))?;
        }
        Ok(())
    }
}

/// Computed corner radii of `el`, zero when unavailable
fn read_corner_radii(el: &Element, width: f32, height: f32) -> CornerRadii {
    let style = web_sys::window().and_then(|w| w.get_computed_style(el).ok().flatten());
    let Some(style) = style else {
        return CornerRadii::default();
    };
    let read = |prop: &str| style.get_property_value(prop).unwrap_or_default();
    CornerRadii::from_css(
        &read("border-top-left-radius"),
        &read("border-top-right-radius"),
        &read("border-bottom-right-radius"),
        &read("border-bottom-left-radius"),
        width,
        height,
    )
}

fn clip_path_supported() -> bool {
    web_sys::css::supports_with_value("clip-path", CLIP_PROBE).unwrap_or(false)
}

fn prefers_reduced_motion() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-reduced-motion: reduce)").ok().flatten())
        .is_some_and(|query| query.matches())
}

/// Config from the element's attribute; rejected configs fall back to defaults
fn read_config(wrap: &HtmlElement) -> JellyConfig {
    let mut config = match wrap.get_attribute(CONFIG_ATTR) {
        Some(json) if !json.trim().is_empty() => JellyConfig::from_json(&json).unwrap_or_else(|err| {
            log::warn!("Ignoring jelly config: {err}");
            JellyConfig::default()
        }),
        _ => JellyConfig::default(),
    };
    if prefers_reduced_motion() {
        config.reduced_motion = true;
    }
    config
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    capture: bool,
    closure: Closure<dyn FnMut(PointerEvent)>,
}

impl Listener {
    fn attach(
        target: EventTarget,
        kind: &'static str,
        capture: bool,
        closure: Closure<dyn FnMut(PointerEvent)>,
    ) -> Result<Self, JellyError> {
        target
            .add_event_listener_with_callback_and_bool(kind, closure.as_ref().unchecked_ref(), capture)
            .map_err(|e| host_err(kind, e))?;
        Ok(Self {
            target,
            kind,
            capture,
            closure,
        })
    }

    fn detach(&self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.kind,
            self.closure.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

/// A mounted membrane; dropping the handle unmounts it
pub struct JellyHandle {
    instance: Rc<RefCell<Instance>>,
    alive: Rc<Cell<bool>>,
    raf_id: Rc<Cell<Option<i32>>>,
    observer: ResizeObserver,
    _on_resize: Closure<dyn FnMut(js_sys::Array)>,
    listeners: Vec<Listener>,
}

impl JellyHandle {
    /// Stop the frame loop, detach every listener and remove the inserted nodes
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for JellyHandle {
    fn drop(&mut self) {
        self.alive.set(false);
        if let (Some(id), Some(window)) = (self.raf_id.get(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        self.observer.disconnect();
        for listener in &self.listeners {
            listener.detach();
        }
        if let Ok(inst) = self.instance.try_borrow() {
            inst.sink.blob.remove();
            if let Some(svg) = &inst.svg {
                svg.remove();
            }
        }
        log::info!("Jelly unmounted");
    }
}

fn create_svg_element(document: &Document, tag: &str) -> Result<Element, JellyError> {
    document
        .create_element_ns(Some(SVG_NS), tag)
        .map_err(|e| host_err("create svg element", e))
}

/// Mount a membrane on `wrap`
pub fn mount(wrap: HtmlElement) -> Result<JellyHandle, JellyError> {
    let window = web_sys::window().ok_or_else(|| JellyError::Host("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| JellyError::Host("no document".into()))?;

    let config = read_config(&wrap);
    let outline = config.outline.clone();
    let jelly = Jelly::new(config, clip_path_supported());

    let wrap_style = wrap.style();
    for (prop, value) in styles::WRAP_STYLES {
        let _ = wrap_style.set_property(prop, value);
    }

    let blob: HtmlElement = document
        .create_element("div")
        .map_err(|e| host_err("create blob", e))?
        .dyn_into()
        .map_err(|_| JellyError::Host("blob is not an HtmlElement".into()))?;
    if let Some(class) = wrap.get_attribute(BLOB_CLASS_ATTR) {
        blob.set_class_name(&class);
    }
    let first = wrap.first_child();
    wrap.insert_before(&blob, first.as_ref())
        .map_err(|e| host_err("insert blob", e))?;

    let (svg, path) = if outline.enabled {
        let svg = create_svg_element(&document, "svg")?;
        let path = create_svg_element(&document, "path")?;
        let stroke_width = outline.stroke_width.to_string();
        let mut attrs = vec![
            ("fill", "none"),
            ("stroke", outline.stroke.as_str()),
            ("stroke-width", stroke_width.as_str()),
            ("vector-effect", "non-scaling-stroke"),
        ];
        if let Some(class) = outline.class_name.as_deref() {
            attrs.push(("class", class));
        }
        for (name, value) in attrs {
            path.set_attribute(name, value)
                .map_err(|e| host_err("outline attribute", e))?;
        }
        let _ = svg.set_attribute("aria-hidden", "true");
        let _ = svg.set_attribute("preserveAspectRatio", "none");
        svg.append_child(&path)
            .map_err(|e| host_err("append outline path", e))?;
        wrap.append_child(&svg)
            .map_err(|e| host_err("append outline", e))?;
        (Some(svg), Some(path))
    } else {
        (None, None)
    };

    let instance = Rc::new(RefCell::new(Instance {
        jelly,
        sink: DomSink {
            blob,
            outline: path,
        },
        wrap: wrap.clone(),
        svg,
    }));

    // Rebuild on confirmed content-box changes (also fires once on observe)
    let on_resize = {
        let instance = instance.clone();
        Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            let Ok(entry) = entries.get(0).dyn_into::<ResizeObserverEntry>() else {
                return;
            };
            let rect = entry.content_rect();
            instance.borrow_mut().remeasure(rect.width(), rect.height());
        })
    };
    let observer = ResizeObserver::new(on_resize.as_ref().unchecked_ref())
        .map_err(|e| host_err("ResizeObserver", e))?;
    observer.observe(&wrap);

    let listeners = attach_pointer_listeners(&wrap, &window, &instance)?;

    let alive = Rc::new(Cell::new(true));
    let raf_id = Rc::new(Cell::new(None));
    request_animation_frame(instance.clone(), alive.clone(), raf_id.clone());

    log::info!(
        "Jelly mounted (clip-path: {})",
        instance.borrow().jelly.clip_supported()
    );

    Ok(JellyHandle {
        instance,
        alive,
        raf_id,
        observer,
        _on_resize: on_resize,
        listeners,
    })
}

fn attach_pointer_listeners(
    wrap: &HtmlElement,
    window: &web_sys::Window,
    instance: &Rc<RefCell<Instance>>,
) -> Result<Vec<Listener>, JellyError> {
    let target: EventTarget = wrap.clone().into();
    let mut listeners = Vec::with_capacity(5);

    let inst = instance.clone();
    listeners.push(Listener::attach(
        target.clone(),
        "pointerenter",
        false,
        Closure::new(move |e: PointerEvent| {
            let mut inst = inst.borrow_mut();
            let (x, y) = inst.local(&e);
            inst.jelly.pointer_enter(x, y);
        }),
    )?);

    let inst = instance.clone();
    listeners.push(Listener::attach(
        target.clone(),
        "pointerleave",
        false,
        Closure::new(move |_e: PointerEvent| {
            inst.borrow_mut().jelly.pointer_leave();
        }),
    )?);

    let inst = instance.clone();
    listeners.push(Listener::attach(
        target.clone(),
        "pointermove",
        true,
        Closure::new(move |e: PointerEvent| {
            let mut inst = inst.borrow_mut();
            let (x, y) = inst.local(&e);
            inst.jelly.pointer_move(x, y);
        }),
    )?);

    let inst = instance.clone();
    listeners.push(Listener::attach(
        target,
        "pointerdown",
        true,
        Closure::new(move |e: PointerEvent| {
            let mut inst = inst.borrow_mut();
            let (x, y) = inst.local(&e);
            inst.jelly.pointer_down(x, y);
            let _ = inst.wrap.set_pointer_capture(e.pointer_id());
        }),
    )?);

    // Releases land on the window when the pointer ends outside the wrapper
    let inst = instance.clone();
    listeners.push(Listener::attach(
        window.clone().into(),
        "pointerup",
        false,
        Closure::new(move |e: PointerEvent| {
            let mut inst = inst.borrow_mut();
            inst.jelly.pointer_up();
            let _ = inst.wrap.release_pointer_capture(e.pointer_id());
        }),
    )?);

    Ok(listeners)
}

fn request_animation_frame(
    instance: Rc<RefCell<Instance>>,
    alive: Rc<Cell<bool>>,
    raf_id: Rc<Cell<Option<i32>>>,
) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let ids = raf_id.clone();
    let closure = Closure::once(move |now: f64| {
        if !alive.get() {
            return;
        }
        {
            let mut guard = instance.borrow_mut();
            let Instance { jelly, sink, .. } = &mut *guard;
            jelly.frame(now, sink);
        }
        request_animation_frame(instance, alive, raf_id);
    });
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(id) => ids.set(Some(id)),
        Err(err) => log::error!("requestAnimationFrame failed: {err:?}"),
    }
    closure.forget();
}

thread_local! {
    static MOUNTED: RefCell<Vec<JellyHandle>> = const { RefCell::new(Vec::new()) };
}

/// Mount every `[data-jelly]` element in the document. Returns how many
/// mounted; failures are logged and skipped.
pub fn mount_all() -> Result<usize, JellyError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JellyError::Host("no document".into()))?;
    let nodes = document
        .query_selector_all(&format!("[{CONFIG_ATTR}]"))
        .map_err(|e| host_err("query", e))?;

    let mut count = 0;
    for i in 0..nodes.length() {
        let Some(wrap) = nodes.get(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        match mount(wrap) {
            Ok(handle) => {
                MOUNTED.with(|m| m.borrow_mut().push(handle));
                count += 1;
            }
            Err(err) => log::error!("Failed to mount jelly: {err}"),
        }
    }
    Ok(count)
}

/// Unmount everything [`mount_all`] mounted
#[wasm_bindgen]
pub fn unmount_all() {
    let handles = MOUNTED.with(|m| std::mem::take(&mut *m.borrow_mut()));
    for handle in handles {
        handle.unmount();
    }
}
