//! In-memory document used to drive the controller without a browser.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::{Rc, Weak};
use std::task::Context;

use futures::channel::oneshot;
use futures_util::future::LocalBoxFuture;

use zoomable_core::{
    Callback, ListenOn, Offset, Rect, ScrollMetrics, Size, Stage, TargetId, ViewportMetrics,
    ZoomError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Node(NodeId),
    Document,
}

#[derive(Default)]
struct NodeData {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    size: Size,
    rect: Rect,
    binding: Option<TargetId>,
}

struct Registration {
    slot: Slot,
    event: String,
    callback: Callback,
}

type ProbeResult = Result<Size, ZoomError>;

#[derive(Default)]
struct FakeDom {
    nodes: Vec<NodeData>,
    listeners: BTreeMap<u64, Registration>,
    next_listener: u64,
    tasks: Vec<LocalBoxFuture<'static, ()>>,
    probes: BTreeMap<String, Vec<oneshot::Sender<ProbeResult>>>,
    refused_events: BTreeSet<String>,
    viewport: ViewportMetrics,
    scroll: ScrollMetrics,
}

impl FakeDom {
    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn unlink(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|child| *child != id);
        }
    }

    fn walk(&self, from: NodeId, out: &mut Vec<NodeId>) {
        out.push(from);
        for child in &self.node(from).children {
            self.walk(*child, out);
        }
    }

    /// Layout box of `id` before transforms. Nodes created at runtime have
    /// no box of their own and take the box of their first laid-out child,
    /// as a shrink-wrapping container does.
    fn layout_rect(&self, id: NodeId) -> Option<Rect> {
        let node = self.node(id);
        if node.rect != Rect::default() {
            return Some(node.rect);
        }
        node.children
            .iter()
            .find_map(|child| self.layout_rect(*child))
    }

    /// Translation of the node's `transform` style, if it starts with
    /// `translate(..)`.
    fn translation(&self, id: NodeId) -> (f64, f64) {
        let Some(args) = self
            .node(id)
            .style
            .get("transform")
            .and_then(|value| value.strip_prefix("translate("))
            .and_then(|rest| rest.split(')').next())
        else {
            return (0.0, 0.0);
        };
        let mut parts = args
            .split(',')
            .map(|part| part.trim().trim_end_matches("px").parse::<f64>().unwrap_or(0.0));
        (parts.next().unwrap_or(0.0), parts.next().unwrap_or(0.0))
    }

    fn matches(&self, id: NodeId, selector: &str) -> bool {
        let node = self.node(id);
        if let Some(class) = selector.strip_prefix('.') {
            return node.classes.iter().any(|c| c == class);
        }
        if let Some(inner) = selector.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return match inner.split_once('=') {
                Some((name, value)) => {
                    let value = value.trim_matches(|c| c == '"' || c == '\'');
                    node.attributes.get(name).map(String::as_str) == Some(value)
                }
                None => node.attributes.contains_key(inner),
            };
        }
        node.tag == selector
    }
}

pub struct FakeListener {
    id: u64,
    dom: Weak<RefCell<FakeDom>>,
}

impl Drop for FakeListener {
    fn drop(&mut self) {
        if let Some(dom) = self.dom.upgrade() {
            dom.borrow_mut().listeners.remove(&self.id);
        }
    }
}

#[derive(Clone)]
pub struct FakeStage {
    dom: Rc<RefCell<FakeDom>>,
}

impl FakeStage {
    /// A document with a `body` root and a 1000x800 viewport.
    pub fn new() -> Self {
        let stage = Self {
            dom: Rc::new(RefCell::new(FakeDom::default())),
        };
        {
            let mut dom = stage.dom.borrow_mut();
            dom.nodes.push(NodeData {
                tag: "body".to_string(),
                ..NodeData::default()
            });
            dom.viewport = ViewportMetrics {
                client: Size::new(1000.0, 800.0),
                inner: Some(Size::new(1000.0, 800.0)),
            };
        }
        stage
    }

    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    pub fn add_node(&self, parent: NodeId, tag: &str) -> NodeId {
        let mut dom = self.dom.borrow_mut();
        let id = NodeId(dom.nodes.len());
        dom.nodes.push(NodeData {
            tag: tag.to_string(),
            parent: Some(parent),
            ..NodeData::default()
        });
        dom.node_mut(parent).children.push(id);
        id
    }

    /// An `<img data-action="zoom">` under the body, laid out at `rect`.
    pub fn add_image(&self, src: Option<&str>, rect: Rect) -> NodeId {
        let id = self.add_node(self.body(), "img");
        let mut dom = self.dom.borrow_mut();
        let node = dom.node_mut(id);
        node.attributes
            .insert("data-action".to_string(), "zoom".to_string());
        if let Some(src) = src {
            node.attributes.insert("src".to_string(), src.to_string());
        }
        node.size = Size::new(rect.width, rect.height);
        node.rect = rect;
        id
    }

    pub fn add_orphan(&self, tag: &str) -> NodeId {
        let mut dom = self.dom.borrow_mut();
        let id = NodeId(dom.nodes.len());
        dom.nodes.push(NodeData {
            tag: tag.to_string(),
            ..NodeData::default()
        });
        id
    }

    pub fn set_size(&self, node: NodeId, size: Size) {
        self.dom.borrow_mut().node_mut(node).size = size;
    }

    /// Make every later registration for `event` fail.
    pub fn refuse_listeners(&self, event: &str) {
        self.dom.borrow_mut().refused_events.insert(event.to_string());
    }

    pub fn set_viewport(&self, viewport: Size) {
        self.dom.borrow_mut().viewport = ViewportMetrics {
            client: viewport,
            inner: Some(viewport),
        };
    }

    pub fn set_scroll_top(&self, top: f64) {
        self.dom.borrow_mut().scroll = ScrollMetrics {
            root: Offset { top, left: 0.0 },
            body: Offset::default(),
            window_y: top,
        };
    }

    pub fn tag(&self, node: NodeId) -> String {
        self.dom.borrow().node(node).tag.clone()
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.dom.borrow().node(node).classes.clone()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.dom.borrow().node(node).children.clone()
    }

    pub fn attributes(&self, node: NodeId) -> BTreeMap<String, String> {
        self.dom.borrow().node(node).attributes.clone()
    }

    pub fn style(&self, node: NodeId) -> BTreeMap<String, String> {
        self.dom.borrow().node(node).style.clone()
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        let dom = self.dom.borrow();
        let mut current = node;
        while let Some(parent) = dom.node(current).parent {
            current = parent;
        }
        current == NodeId(0)
    }

    pub fn listener_count(&self, node: Option<NodeId>, event: &str) -> usize {
        let slot = node.map(Slot::Node).unwrap_or(Slot::Document);
        self.dom
            .borrow()
            .listeners
            .values()
            .filter(|registration| registration.slot == slot && registration.event == event)
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        self.dom.borrow().listeners.len()
    }

    pub fn pending_probes(&self) -> Vec<String> {
        self.dom.borrow().probes.keys().cloned().collect()
    }

    /// Complete every outstanding probe for `source`, then let tasks run.
    pub fn finish_probe(&self, source: &str, result: Result<Size, ZoomError>) {
        let senders = self
            .dom
            .borrow_mut()
            .probes
            .remove(source)
            .unwrap_or_default();
        for sender in senders {
            let _ = sender.send(result.clone());
        }
        self.run_until_stalled();
    }

    /// Dispatch `event` to listeners on `node` (or the document), then drain
    /// spawned tasks the way a browser drains microtasks after a handler.
    pub fn fire(&self, node: Option<NodeId>, event: &str) {
        let slot = node.map(Slot::Node).unwrap_or(Slot::Document);
        let ids: Vec<u64> = self
            .dom
            .borrow()
            .listeners
            .iter()
            .filter(|(_, registration)| registration.slot == slot && registration.event == event)
            .map(|(id, _)| *id)
            .collect();

        for id in ids {
            let callback = self
                .dom
                .borrow()
                .listeners
                .get(&id)
                .map(|registration| registration.callback.clone());
            if let Some(callback) = callback {
                callback();
            }
        }
        self.run_until_stalled();
    }

    /// Deliver `event` to the document `times` times before any task runs,
    /// as when several scroll events queue up inside one frame.
    pub fn burst(&self, event: &str, times: usize) {
        for _ in 0..times {
            let callbacks: Vec<Callback> = self
                .dom
                .borrow()
                .listeners
                .values()
                .filter(|registration| {
                    registration.slot == Slot::Document && registration.event == event
                })
                .map(|registration| registration.callback.clone())
                .collect();
            for callback in callbacks {
                callback();
            }
        }
        self.run_until_stalled();
    }

    pub fn click(&self, node: NodeId) {
        self.fire(Some(node), "click");
    }

    pub fn scroll(&self) {
        self.fire(None, "scroll");
    }

    pub fn run_until_stalled(&self) {
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        loop {
            let tasks = std::mem::take(&mut self.dom.borrow_mut().tasks);
            if tasks.is_empty() {
                return;
            }
            let polled = tasks.len();
            let mut pending = Vec::new();
            for mut task in tasks {
                if task.as_mut().poll(&mut cx).is_pending() {
                    pending.push(task);
                }
            }
            let mut dom = self.dom.borrow_mut();
            let progressed = pending.len() < polled || !dom.tasks.is_empty();
            pending.append(&mut dom.tasks);
            dom.tasks = pending;
            if !progressed {
                return;
            }
        }
    }
}

impl Stage for FakeStage {
    type Node = NodeId;
    type Listener = FakeListener;

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.dom.borrow().node(*node).parent
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let dom = self.dom.borrow();
        let parent = dom.node(*node).parent?;
        let siblings = &dom.node(parent).children;
        let index = siblings.iter().position(|child| child == node)?;
        siblings.get(index + 1).copied()
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, ZoomError> {
        Ok(self.add_orphan(tag))
    }

    fn insert_before(
        &self,
        parent: &NodeId,
        child: &NodeId,
        reference: Option<&NodeId>,
    ) -> Result<(), ZoomError> {
        let mut dom = self.dom.borrow_mut();
        if reference == Some(child) {
            return Ok(());
        }
        dom.unlink(*child);
        let index = match reference {
            Some(reference) => dom
                .node(*parent)
                .children
                .iter()
                .position(|c| c == reference)
                .ok_or_else(|| ZoomError::Dom("reference is not a child".to_string()))?,
            None => dom.node(*parent).children.len(),
        };
        dom.node_mut(*parent).children.insert(index, *child);
        dom.node_mut(*child).parent = Some(*parent);
        Ok(())
    }

    fn detach(&self, node: &NodeId) {
        self.dom.borrow_mut().unlink(*node);
    }

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, ZoomError> {
        let dom = self.dom.borrow();
        let mut all = Vec::new();
        dom.walk(NodeId(0), &mut all);
        Ok(all
            .into_iter()
            .filter(|id| dom.matches(*id, selector))
            .collect())
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.dom.borrow().node(*node).classes.iter().any(|c| c == class)
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        let mut dom = self.dom.borrow_mut();
        let classes = &mut dom.node_mut(*node).classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.dom
            .borrow_mut()
            .node_mut(*node)
            .classes
            .retain(|c| c != class);
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.dom.borrow().node(*node).attributes.get(name).cloned()
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        self.dom
            .borrow_mut()
            .node_mut(*node)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn style_property(&self, node: &NodeId, name: &str) -> Option<String> {
        self.dom.borrow().node(*node).style.get(name).cloned()
    }

    fn set_style_property(&self, node: &NodeId, name: &str, value: &str) {
        let mut dom = self.dom.borrow_mut();
        let style = &mut dom.node_mut(*node).style;
        if value.is_empty() {
            style.remove(name);
        } else {
            style.insert(name.to_string(), value.to_string());
        }
    }

    fn rendered_size(&self, node: &NodeId) -> Size {
        self.dom.borrow().node(*node).size
    }

    fn bounding_rect(&self, node: &NodeId) -> Rect {
        let dom = self.dom.borrow();
        let rect = dom.layout_rect(*node).unwrap_or_default();
        let (dx, dy) = dom.translation(*node);
        // rects are stored in document space; report them viewport-relative
        Rect {
            top: rect.top + dy - dom.scroll.window_y,
            left: rect.left + dx,
            ..rect
        }
    }

    fn viewport_metrics(&self) -> ViewportMetrics {
        self.dom.borrow().viewport
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        self.dom.borrow().scroll
    }

    fn listen(
        &self,
        on: ListenOn<'_, NodeId>,
        event: &str,
        callback: Callback,
    ) -> Result<FakeListener, ZoomError> {
        let slot = match on {
            ListenOn::Node(node) => Slot::Node(*node),
            ListenOn::Document => Slot::Document,
        };
        let mut dom = self.dom.borrow_mut();
        if dom.refused_events.contains(event) {
            return Err(ZoomError::Dom(format!("cannot listen for {event}")));
        }
        dom.next_listener += 1;
        let id = dom.next_listener;
        dom.listeners.insert(
            id,
            Registration {
                slot,
                event: event.to_string(),
                callback,
            },
        );
        Ok(FakeListener {
            id,
            dom: Rc::downgrade(&self.dom),
        })
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.dom.borrow_mut().tasks.push(task);
    }

    fn probe_natural_size(&self, source: &str) -> LocalBoxFuture<'static, Result<Size, ZoomError>> {
        let (sender, receiver) = oneshot::channel();
        self.dom
            .borrow_mut()
            .probes
            .entry(source.to_string())
            .or_default()
            .push(sender);
        Box::pin(async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(ZoomError::ImageLoad("probe abandoned".to_string())))
        })
    }

    fn binding_tag(&self, node: &NodeId) -> Option<TargetId> {
        self.dom.borrow().node(*node).binding
    }

    fn set_binding_tag(&self, node: &NodeId, tag: Option<TargetId>) {
        self.dom.borrow_mut().node_mut(*node).binding = tag;
    }
}

/// 400x300 image at document position (100, 1250).
pub fn standard_rect() -> Rect {
    Rect {
        top: 1250.0,
        left: 100.0,
        width: 400.0,
        height: 300.0,
    }
}
