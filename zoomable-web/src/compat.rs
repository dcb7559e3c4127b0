//! Engine feature detection, run once per page.

use once_cell::unsync::OnceCell;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

use zoomable_core::compat::STANDARD_ANIMATION_END;
use zoomable_core::PrefixedShim;

thread_local! {
    static DETECTED: OnceCell<PrefixedShim> = OnceCell::new();
}

/// The prefixed shim for this engine. The first call probes a scratch
/// element's style object; later calls return the cached result.
pub fn detect_shim(document: &Document) -> PrefixedShim {
    DETECTED.with(|cell| cell.get_or_init(|| probe(document)).clone())
}

fn probe(document: &Document) -> PrefixedShim {
    let style = match document
        .create_element("fakeelement")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    {
        Some(el) => el.style(),
        None => {
            log::warn!("Feature probe element unavailable, assuming {STANDARD_ANIMATION_END}");
            return PrefixedShim::new(STANDARD_ANIMATION_END);
        }
    };

    let shim = PrefixedShim::detect(|property| {
        js_sys::Reflect::get(&style, &JsValue::from_str(property))
            .map(|value| !value.is_undefined())
            .unwrap_or(false)
    });
    log::info!("Animation end event: {}", shim.animation_end());
    shim
}
