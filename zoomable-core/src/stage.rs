//! The host seam: everything the controller needs from a document.

use std::fmt;
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;

use crate::geometry::{Rect, ScrollMetrics, Size, ViewportMetrics};
use crate::ZoomError;

/// Callback invoked when a subscribed event fires. Shared so one callback can
/// sit behind several prefixed event names.
pub type Callback = Rc<dyn Fn()>;

/// Where a listener is attached.
#[derive(Debug, Clone, Copy)]
pub enum ListenOn<'a, N> {
    Node(&'a N),
    Document,
}

/// A document host.
///
/// Mutations of classes, attributes and inline styles are assumed to always
/// succeed; only structural operations and listener registration report
/// failure.
pub trait Stage: 'static {
    type Node: Clone + PartialEq + fmt::Debug + 'static;
    /// Registration handle. Dropping it removes the listener.
    type Listener: 'static;

    // ── Tree ────────────────────────────────────────────────────────────────

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    fn create_element(&self, tag: &str) -> Result<Self::Node, ZoomError>;
    /// Insert `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. Moves `child` if it is already attached.
    fn insert_before(
        &self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<(), ZoomError>;
    /// Remove `node` from its parent; no-op when already detached.
    fn detach(&self, node: &Self::Node);
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>, ZoomError>;

    // ── Classes, attributes, styles ─────────────────────────────────────────

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn style_property(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_style_property(&self, node: &Self::Node, name: &str, value: &str);

    // ── Measurement ─────────────────────────────────────────────────────────

    /// Layout box size (offset width/height).
    fn rendered_size(&self, node: &Self::Node) -> Size;
    fn bounding_rect(&self, node: &Self::Node) -> Rect;
    fn viewport_metrics(&self) -> ViewportMetrics;
    fn scroll_metrics(&self) -> ScrollMetrics;

    // ── Events and tasks ────────────────────────────────────────────────────

    fn listen(
        &self,
        on: ListenOn<'_, Self::Node>,
        event: &str,
        callback: Callback,
    ) -> Result<Self::Listener, ZoomError>;
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
    /// Load `source` off-document and report its intrinsic pixel size.
    fn probe_natural_size(&self, source: &str) -> LocalBoxFuture<'static, Result<Size, ZoomError>>;

    // ── Binding tags ────────────────────────────────────────────────────────

    fn binding_tag(&self, node: &Self::Node) -> Option<crate::TargetId>;
    fn set_binding_tag(&self, node: &Self::Node, tag: Option<crate::TargetId>);
}
