//! `Stage` over the live browser document.

use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Node, Window};

use zoomable_core::{
    Callback, ListenOn, Offset, Rect, ScrollMetrics, Size, Stage, TargetId, ViewportMetrics,
    ZoomError,
};

use crate::probe;

/// Expando property holding the binding tag on bound elements.
pub const BINDING_PROPERTY: &str = "__zoomable__";

pub(crate) fn dom_error(err: JsValue) -> ZoomError {
    ZoomError::Dom(
        err.as_string()
            .unwrap_or_else(|| format!("{err:?}")),
    )
}

#[derive(Clone)]
pub struct WebStage {
    window: Window,
    document: Document,
}

impl WebStage {
    pub fn new() -> Result<Self, ZoomError> {
        let window = web_sys::window().ok_or(ZoomError::NoDocument)?;
        let document = window.document().ok_or(ZoomError::NoDocument)?;
        Ok(Self { window, document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

/// A registered DOM listener. Removed from its target on drop.
pub struct WebListener {
    target: EventTarget,
    event: String,
    closure: Closure<dyn FnMut(Event)>,
}

impl Drop for WebListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(&self.event, self.closure.as_ref().unchecked_ref());
    }
}

impl Stage for WebStage {
    type Node = Element;
    type Listener = WebListener;

    // ── Tree ────────────────────────────────────────────────────────────────

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn next_sibling(&self, node: &Element) -> Option<Element> {
        node.next_element_sibling()
    }

    fn create_element(&self, tag: &str) -> Result<Element, ZoomError> {
        self.document.create_element(tag).map_err(dom_error)
    }

    fn insert_before(
        &self,
        parent: &Element,
        child: &Element,
        reference: Option<&Element>,
    ) -> Result<(), ZoomError> {
        parent
            .insert_before(child, reference.map(AsRef::<Node>::as_ref))
            .map(|_| ())
            .map_err(dom_error)
    }

    fn detach(&self, node: &Element) {
        node.remove();
    }

    fn query_all(&self, selector: &str) -> Result<Vec<Element>, ZoomError> {
        let list = self.document.query_selector_all(selector).map_err(dom_error)?;
        Ok((0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    // ── Classes, attributes, styles ─────────────────────────────────────────

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn style_property(&self, node: &Element, name: &str) -> Option<String> {
        let element = node.dyn_ref::<HtmlElement>()?;
        element
            .style()
            .get_property_value(name)
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn set_style_property(&self, node: &Element, name: &str, value: &str) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        if value.is_empty() {
            let _ = style.remove_property(name);
        } else {
            let _ = style.set_property(name, value);
        }
    }

    // ── Measurement ─────────────────────────────────────────────────────────

    fn rendered_size(&self, node: &Element) -> Size {
        match node.dyn_ref::<HtmlElement>() {
            Some(element) => Size::new(element.offset_width() as f64, element.offset_height() as f64),
            None => {
                let rect = node.get_bounding_client_rect();
                Size::new(rect.width(), rect.height())
            }
        }
    }

    fn bounding_rect(&self, node: &Element) -> Rect {
        let rect = node.get_bounding_client_rect();
        Rect {
            top: rect.top(),
            left: rect.left(),
            width: rect.width(),
            height: rect.height(),
        }
    }

    fn viewport_metrics(&self) -> ViewportMetrics {
        let client = self
            .document
            .document_element()
            .map(|root| Size::new(root.client_width() as f64, root.client_height() as f64))
            .unwrap_or_default();
        let inner_width = self.window.inner_width().ok().and_then(|v| v.as_f64());
        let inner_height = self.window.inner_height().ok().and_then(|v| v.as_f64());
        let inner = match (inner_width, inner_height) {
            (Some(width), Some(height)) => Some(Size::new(width, height)),
            _ => None,
        };
        ViewportMetrics { client, inner }
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        let offset_of = |element: Option<Element>| {
            element
                .map(|el| Offset {
                    top: el.scroll_top() as f64,
                    left: el.scroll_left() as f64,
                })
                .unwrap_or_default()
        };
        ScrollMetrics {
            root: offset_of(self.document.document_element()),
            body: offset_of(self.document.body().map(Into::into)),
            window_y: self.window.scroll_y().unwrap_or(0.0),
        }
    }

    // ── Events and tasks ────────────────────────────────────────────────────

    fn listen(
        &self,
        on: ListenOn<'_, Element>,
        event: &str,
        callback: Callback,
    ) -> Result<WebListener, ZoomError> {
        let target: EventTarget = match on {
            ListenOn::Node(node) => node.clone().into(),
            ListenOn::Document => self.document.clone().into(),
        };
        let closure = Closure::wrap(Box::new(move |_event: Event| {
            callback();
        }) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        Ok(WebListener {
            target,
            event: event.to_string(),
            closure,
        })
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn probe_natural_size(&self, source: &str) -> LocalBoxFuture<'static, Result<Size, ZoomError>> {
        probe::natural_size(source.to_string()).boxed_local()
    }

    // ── Binding tags ────────────────────────────────────────────────────────

    fn binding_tag(&self, node: &Element) -> Option<TargetId> {
        js_sys::Reflect::get(node, &JsValue::from_str(BINDING_PROPERTY))
            .ok()
            .and_then(|value| value.as_f64())
            .map(|id| TargetId(id as u32))
    }

    fn set_binding_tag(&self, node: &Element, tag: Option<TargetId>) {
        let key = JsValue::from_str(BINDING_PROPERTY);
        match tag {
            Some(id) => {
                let _ = js_sys::Reflect::set(node, &key, &JsValue::from_f64(id.0 as f64));
            }
            None => {
                let _ = js_sys::Reflect::delete_property::<JsValue>(node.unchecked_ref(), &key);
            }
        }
    }
}
