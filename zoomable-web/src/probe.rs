//! Off-document image load used to learn an image's intrinsic size.

use js_sys::{Array, Function, Promise};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

use zoomable_core::{Size, ZoomError};

use crate::stage::dom_error;

pub async fn natural_size(source: String) -> Result<Size, ZoomError> {
    let image = HtmlImageElement::new().map_err(dom_error)?;

    let mut handlers: Option<(Closure<dyn FnMut()>, Closure<dyn FnMut()>)> = None;
    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        let loaded = image.clone();
        let onload = Closure::once(move || {
            let size = Array::of2(
                &JsValue::from_f64(loaded.natural_width() as f64),
                &JsValue::from_f64(loaded.natural_height() as f64),
            );
            let _ = resolve.call1(&JsValue::NULL, &size);
        });
        let onerror = Closure::once(move || {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("image_load_failed"));
        });
        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        handlers = Some((onload, onerror));
    });
    image.set_src(&source);

    let outcome = JsFuture::from(promise).await;
    image.set_onload(None);
    image.set_onerror(None);
    drop(handlers);

    let value = outcome.map_err(|_| ZoomError::ImageLoad(source.clone()))?;
    let pair = Array::from(&value);
    let size = Size::new(
        pair.get(0).as_f64().unwrap_or(0.0),
        pair.get(1).as_f64().unwrap_or(0.0),
    );
    log::debug!("Probed {}: {}x{}", source, size.width, size.height);
    Ok(size)
}
