//! Browser host for the zoom lightbox.
//!
//! Loading the module binds every `[data-action=zoom]` element once the
//! document is parsed. Pages that insert images later call
//! `initializeElements` with their own selector.

use wasm_bindgen::prelude::*;
use web_sys::Element;

use zoomable_core::{Stage, ZoomConfig, ZoomError};

pub mod bootstrap;
pub mod compat;
pub mod probe;
pub mod stage;

pub use bootstrap::with_page;
pub use compat::detect_shim;
pub use stage::{WebListener, WebStage, BINDING_PROPERTY};

fn to_js(err: ZoomError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Options passed from JS: `undefined`/`null` means defaults, anything else
/// is read as a `ZoomConfig` object.
fn options_from_js(options: &JsValue) -> Result<ZoomConfig, ZoomError> {
    if options.is_undefined() || options.is_null() {
        return Ok(ZoomConfig::default());
    }
    let raw = js_sys::JSON::stringify(options)
        .map_err(stage::dom_error)?
        .as_string()
        .ok_or_else(|| ZoomError::InvalidConfig("options are not serializable".to_string()))?;
    let config = ZoomConfig::from_json(&raw)?;
    config.validate()?;
    Ok(config)
}

// ============================================================================
// Entry point
// ============================================================================

#[wasm_bindgen(start)]
pub fn start() {
    wasm_logger::init(wasm_logger::Config::default());
    if let Err(err) = bootstrap::bind_when_ready() {
        log::error!("Zoom bootstrap failed: {err}");
    }
}

// ============================================================================
// Exports
// ============================================================================

/// Bind every match of `selector` not already bound. Returns the number of
/// newly bound elements.
#[wasm_bindgen(js_name = initializeElements)]
pub fn initialize_elements(selector: &str, options: JsValue) -> Result<u32, JsValue> {
    let base = options_from_js(&options).map_err(to_js)?;
    with_page(|page| page.bind_selector_with(selector, &base))
        .map(|count| count as u32)
        .map_err(to_js)
}

#[wasm_bindgen(js_name = unbindElements)]
pub fn unbind_elements(selector: &str) -> Result<u32, JsValue> {
    with_page(|page| page.unbind_selector(selector))
        .map(|count| count as u32)
        .map_err(to_js)
}

/// Toggle a bound element as if it were clicked. Returns whether the
/// element is zoomed afterwards.
#[wasm_bindgen(js_name = toggleZoom)]
pub fn toggle_zoom(element: &Element) -> Result<bool, JsValue> {
    let zoomable = with_page(|page| page.lookup(element).ok_or(ZoomError::NotBound)).map_err(to_js)?;
    zoomable.toggle().map_err(to_js)?;
    Ok(zoomable.is_zoomed())
}

/// Whether `element` currently carries a binding.
#[wasm_bindgen(js_name = isBound)]
pub fn is_bound(element: &Element) -> Result<bool, JsValue> {
    with_page(|page| Ok(page.context().stage().binding_tag(element).is_some())).map_err(to_js)
}
