//! The page-wide binding set and automatic binding on document ready.

use std::cell::RefCell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use zoomable_core::{ZoomConfig, ZoomError, ZoomPage, DEFAULT_SELECTOR};

use crate::compat::detect_shim;
use crate::stage::{dom_error, WebStage};

thread_local! {
    static PAGE: RefCell<Option<ZoomPage<WebStage>>> = const { RefCell::new(None) };
}

/// Run `f` against the page binding set, creating it on first use.
pub fn with_page<R>(
    f: impl FnOnce(&mut ZoomPage<WebStage>) -> Result<R, ZoomError>,
) -> Result<R, ZoomError> {
    PAGE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            let stage = WebStage::new()?;
            let shim = detect_shim(stage.document());
            *slot = Some(ZoomPage::new(stage, shim, ZoomConfig::default()));
        }
        match slot.as_mut() {
            Some(page) => f(page),
            None => Err(ZoomError::NoDocument),
        }
    })
}

fn bind_defaults() {
    match with_page(|page| page.bind_selector(DEFAULT_SELECTOR)) {
        Ok(count) => log::info!("Bound {count} zoomable element(s)"),
        Err(err) => log::error!("Automatic binding failed: {err}"),
    }
}

/// Bind `[data-action=zoom]` once the document is parsed.
pub fn bind_when_ready() -> Result<(), ZoomError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(ZoomError::NoDocument)?;

    if document.ready_state() != "loading" {
        bind_defaults();
        return Ok(());
    }

    let callback = Closure::once(bind_defaults);
    document
        .add_event_listener_with_callback("DOMContentLoaded", callback.as_ref().unchecked_ref())
        .map_err(dom_error)?;
    // DOMContentLoaded fires once per page
    callback.forget();
    Ok(())
}
