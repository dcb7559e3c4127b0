//! Per-element zoom state machine.
//!
//! `idle -> zooming-in -> zoomed -> zooming-out -> idle`. The transient
//! phases end when the host reports the transform transition finished.
//! Clicking during a transient phase interrupts it: the toggle direction is
//! read from the `zoomed` marker on the element at click time.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::compat::CompatShim;
use crate::config::ZoomConfig;
use crate::fit::{fit_transform, FitTransform};
use crate::geometry::{current_viewport, document_offset, Size};
use crate::layout;
use crate::registry::TransitionRegistry;
use crate::resolver::{resolve_natural_size, Resolved};
use crate::source::image_source;
use crate::stage::{Callback, ListenOn, Stage};
use crate::{
    TargetId, ZoomError, FADE_IN, FADE_OUT, ZOOMED, ZOOMING, ZOOMING_IN, ZOOMING_OUT,
    ZOOM_OVERLAY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ZoomingIn,
    Zoomed,
    ZoomingOut,
}

/// What initiated a zoom-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Element,
    Overlay,
    Scroll,
    Api,
}

// ── Shared context ──────────────────────────────────────────────────────────

/// Host, prefix shim and transition registry shared by every target on a
/// page.
pub struct ZoomContext<S: Stage> {
    stage: S,
    shim: Box<dyn CompatShim<S>>,
    registry: RefCell<TransitionRegistry<S::Node>>,
}

impl<S: Stage> ZoomContext<S> {
    pub fn new(stage: S, shim: impl CompatShim<S> + 'static) -> Rc<Self> {
        Rc::new(Self {
            stage,
            shim: Box::new(shim),
            registry: RefCell::new(TransitionRegistry::new()),
        })
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn shim(&self) -> &dyn CompatShim<S> {
        self.shim.as_ref()
    }

    /// Targets currently marked as transitioning.
    pub fn transitioning(&self) -> Vec<TargetId> {
        self.registry.borrow().ids()
    }

    /// Clear the `zooming` marker from every transitioning target.
    pub fn sweep_transitions(&self) -> usize {
        self.registry.borrow_mut().sweep(&self.stage)
    }

    fn mark_transitioning(&self, id: TargetId, node: &S::Node) {
        self.stage.add_class(node, ZOOMING);
        self.registry.borrow_mut().enter(id, node.clone());
    }

    fn unmark_transitioning(&self, id: TargetId) {
        self.registry.borrow_mut().leave(id);
    }
}

// ── Target state ────────────────────────────────────────────────────────────

struct ActiveOverlay<S: Stage> {
    node: S::Node,
    click: S::Listener,
}

struct FadingOverlay<S: Stage> {
    node: S::Node,
    animation_end: Vec<S::Listener>,
}

struct ZoomTarget<S: Stage> {
    id: TargetId,
    this: Weak<RefCell<ZoomTarget<S>>>,
    ctx: Rc<ZoomContext<S>>,
    element: S::Node,
    wrapper: S::Node,
    config: ZoomConfig,
    phase: Phase,
    ignoring_scroll: bool,
    bound: bool,
    natural_size: Option<Size>,
    filler: Option<S::Node>,
    overlay: Option<ActiveOverlay<S>>,
    fading: Vec<FadingOverlay<S>>,
    click_listener: Option<S::Listener>,
    transition_listeners: Vec<S::Listener>,
    scroll_listener: Option<S::Listener>,
}

/// Wrap a target action into a host callback. The target is held weakly so
/// a dropped binding turns late events into no-ops.
fn dispatch<S, F>(this: &Weak<RefCell<ZoomTarget<S>>>, event: &'static str, action: F) -> Callback
where
    S: Stage,
    F: Fn(&mut ZoomTarget<S>) -> Result<(), ZoomError> + 'static,
{
    let this = this.clone();
    Rc::new(move || {
        let Some(target) = this.upgrade() else {
            return;
        };
        let Ok(mut target) = target.try_borrow_mut() else {
            log::warn!("Ignoring re-entrant {event} while the target is busy");
            return;
        };
        if !target.bound {
            return;
        }
        if let Err(err) = action(&mut target) {
            log::warn!("Zoom target {} failed to handle {event}: {err}", target.id);
        }
    })
}

impl<S: Stage> ZoomTarget<S> {
    fn stage(&self) -> &S {
        &self.ctx.stage
    }

    /// Listeners removed from inside their own callback are dropped on the
    /// next task rather than synchronously.
    fn retire(&self, listeners: Vec<S::Listener>) {
        if listeners.is_empty() {
            return;
        }
        self.stage().spawn(Box::pin(async move {
            drop(listeners);
        }));
    }

    fn is_zoomed(&self) -> bool {
        self.stage().has_class(&self.element, ZOOMED)
    }

    fn measure(&self) -> FitTransform {
        let stage = self.stage();
        let rendered = stage.rendered_size(&self.element);
        // The wrapper holds the element's untransformed slot; the element's own
        // rect would include any transform still in flight.
        let rect = stage.bounding_rect(&self.wrapper);
        let scroll = stage.scroll_metrics();
        let viewport = current_viewport(&stage.viewport_metrics());
        let offset = document_offset(&rect, &scroll);
        let cap = if self.config.use_actual_max {
            self.natural_size
        } else {
            None
        };
        fit_transform(rendered, offset, viewport, scroll.window_y, cap)
    }

    fn on_element_click(&mut self) -> Result<(), ZoomError> {
        if self.is_zoomed() {
            self.zoom_out(Trigger::Element)
        } else {
            self.zoom_in()
        }
    }

    fn on_overlay_click(&mut self) -> Result<(), ZoomError> {
        if self.overlay.is_none() {
            return Ok(());
        }
        self.zoom_out(Trigger::Overlay)
    }

    fn on_scroll(&mut self) -> Result<(), ZoomError> {
        if self.ignoring_scroll || !self.config.scroll_closes() || !self.is_zoomed() {
            return Ok(());
        }
        self.ignoring_scroll = true;
        self.zoom_out(Trigger::Scroll)
    }

    fn on_transition_end(&mut self) -> Result<(), ZoomError> {
        let stage = self.stage();
        stage.remove_class(&self.element, ZOOMING);
        stage.remove_class(&self.element, ZOOMING_IN);
        stage.remove_class(&self.element, ZOOMING_OUT);
        self.ctx.unmark_transitioning(self.id);

        self.phase = match self.phase {
            Phase::ZoomingIn => Phase::Zoomed,
            Phase::ZoomingOut => Phase::Idle,
            settled => settled,
        };
        Ok(())
    }

    fn on_overlay_faded(&mut self, node: &S::Node) -> Result<(), ZoomError> {
        let Some(index) = self.fading.iter().position(|fading| &fading.node == node) else {
            return Ok(());
        };
        let fading = self.fading.remove(index);
        self.stage().detach(&fading.node);
        self.retire(fading.animation_end);
        Ok(())
    }

    fn discard_fading(&mut self) {
        for fading in std::mem::take(&mut self.fading) {
            self.stage().detach(&fading.node);
            self.retire(fading.animation_end);
        }
    }

    fn zoom_in(&mut self) -> Result<(), ZoomError> {
        let ctx = Rc::clone(&self.ctx);
        let stage = &ctx.stage;

        ctx.sweep_transitions();
        self.discard_fading();
        // The zoomed marker was removed behind our back; never stack overlays.
        if let Some(stale) = self.overlay.take() {
            stage.detach(&stale.node);
            self.retire(vec![stale.click]);
        }

        // Fallible steps run before any zoom state changes.
        let overlay = stage.create_element("div")?;
        stage.add_class(&overlay, ZOOM_OVERLAY);
        stage.add_class(&overlay, FADE_IN);
        let click = stage.listen(
            ListenOn::Node(&overlay),
            "click",
            dispatch(&self.this, "overlay click", ZoomTarget::on_overlay_click),
        )?;
        let scroll = if self.config.scroll_closes() && self.scroll_listener.is_none() {
            Some(stage.listen(
                ListenOn::Document,
                "scroll",
                dispatch(&self.this, "scroll", ZoomTarget::on_scroll),
            )?)
        } else {
            None
        };
        let parent = stage.parent(&self.element).ok_or(ZoomError::Detached)?;
        let next = stage.next_sibling(&self.element);
        stage.insert_before(&parent, &overlay, next.as_ref())?;

        self.overlay = Some(ActiveOverlay {
            node: overlay,
            click,
        });
        if scroll.is_some() {
            self.scroll_listener = scroll;
        }

        let transform = self.measure();
        log::debug!("Zoom target {} zooming in: {transform}", self.id);
        ctx.shim.write_transform(stage, &self.element, &transform.to_string());
        stage.remove_class(&self.element, ZOOMING_OUT);
        stage.add_class(&self.element, ZOOMED);
        stage.add_class(&self.element, ZOOMING_IN);
        self.ignoring_scroll = false;

        ctx.mark_transitioning(self.id, &self.element);
        self.phase = Phase::ZoomingIn;
        Ok(())
    }

    fn zoom_out(&mut self, trigger: Trigger) -> Result<(), ZoomError> {
        let ctx = Rc::clone(&self.ctx);
        let stage = &ctx.stage;

        ctx.sweep_transitions();
        log::debug!("Zoom target {} zooming out ({trigger:?})", self.id);
        ctx.shim.write_transform(stage, &self.element, "");
        stage.remove_class(&self.element, ZOOMING_IN);
        stage.add_class(&self.element, ZOOMING_OUT);
        stage.remove_class(&self.element, ZOOMED);

        if let Some(overlay) = self.overlay.take() {
            self.retire(vec![overlay.click]);
            stage.add_class(&overlay.node, FADE_OUT);
            let node = overlay.node.clone();
            let animation_end = ctx.shim.on_animation_end(
                stage,
                &overlay.node,
                dispatch(&self.this, "overlay animation end", move |target| {
                    target.on_overlay_faded(&node)
                }),
            );
            match animation_end {
                Ok(animation_end) => self.fading.push(FadingOverlay {
                    node: overlay.node,
                    animation_end,
                }),
                Err(err) => {
                    log::warn!(
                        "Zoom target {} cannot await the overlay fade, removing it now: {err}",
                        self.id
                    );
                    stage.detach(&overlay.node);
                }
            }
        }

        if let Some(scroll) = self.scroll_listener.take() {
            self.retire(vec![scroll]);
        }

        ctx.mark_transitioning(self.id, &self.element);
        self.phase = Phase::ZoomingOut;
        Ok(())
    }

    /// Insert the filler once natural-size resolution has settled.
    fn settle_dimensions(&mut self, natural: Option<Size>) -> Result<(), ZoomError> {
        if !self.bound || self.filler.is_some() {
            return Ok(());
        }
        let rendered = self.stage().rendered_size(&self.element);
        let filler = layout::insert_filler(self.stage(), &self.element, rendered, natural)?;
        log::debug!(
            "Zoom target {} reserved {}x{} (natural {:?})",
            self.id,
            rendered.width,
            rendered.height,
            natural
        );
        self.natural_size = natural;
        self.filler = Some(filler);
        Ok(())
    }

    fn unbind(&mut self) {
        if !self.bound {
            return;
        }
        self.bound = false;

        let ctx = Rc::clone(&self.ctx);
        let stage = &ctx.stage;

        self.click_listener = None;
        self.transition_listeners.clear();
        self.scroll_listener = None;
        if let Some(overlay) = self.overlay.take() {
            stage.detach(&overlay.node);
        }
        for fading in std::mem::take(&mut self.fading) {
            stage.detach(&fading.node);
        }

        ctx.shim.write_transform(stage, &self.element, "");
        for class in [ZOOMED, ZOOMING, ZOOMING_IN, ZOOMING_OUT] {
            stage.remove_class(&self.element, class);
        }
        ctx.unmark_transitioning(self.id);
        stage.set_binding_tag(&self.element, None);
        self.phase = Phase::Idle;
        log::debug!("Zoom target {} unbound", self.id);
    }
}

// ── Public handle ───────────────────────────────────────────────────────────

/// A bound zoom target. Cloning shares the same target; dropping the last
/// handle releases every listener.
pub struct Zoomable<S: Stage> {
    inner: Rc<RefCell<ZoomTarget<S>>>,
}

impl<S: Stage> Clone for Zoomable<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Stage> fmt::Debug for Zoomable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(target) => f
                .debug_struct("Zoomable")
                .field("id", &target.id)
                .field("phase", &target.phase)
                .field("bound", &target.bound)
                .finish(),
            Err(_) => f.debug_struct("Zoomable").finish_non_exhaustive(),
        }
    }
}

impl<S: Stage> Zoomable<S> {
    /// Wrap `element`, register its listeners and start natural-size
    /// resolution.
    pub fn bind(
        ctx: &Rc<ZoomContext<S>>,
        element: S::Node,
        config: ZoomConfig,
    ) -> Result<Self, ZoomError> {
        config.validate()?;
        let stage = ctx.stage();
        if let Some(existing) = stage.binding_tag(&element) {
            return Err(ZoomError::AlreadyBound(existing));
        }

        let wrapper = layout::wrap(stage, &element)?;
        let id = TargetId::next();
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(ZoomTarget {
                id,
                this: this.clone(),
                ctx: Rc::clone(ctx),
                element: element.clone(),
                wrapper,
                config,
                phase: Phase::Idle,
                ignoring_scroll: false,
                bound: true,
                natural_size: None,
                filler: None,
                overlay: None,
                fading: Vec::new(),
                click_listener: None,
                transition_listeners: Vec::new(),
                scroll_listener: None,
            })
        });

        let zoomable = Self { inner };
        if let Err(err) = zoomable.attach(stage, &element, id) {
            zoomable.inner.borrow_mut().unbind();
            layout::unwrap(stage, &element, &zoomable.wrapper());
            return Err(err);
        }
        log::debug!("Bound zoom target {id}");
        Ok(zoomable)
    }

    /// Register element listeners, tag the element and start natural-size
    /// resolution.
    fn attach(&self, stage: &S, element: &S::Node, id: TargetId) -> Result<(), ZoomError> {
        {
            let mut target = self.inner.borrow_mut();
            let this = target.this.clone();
            let ctx = Rc::clone(&target.ctx);
            target.click_listener = Some(stage.listen(
                ListenOn::Node(element),
                "click",
                dispatch(&this, "click", ZoomTarget::on_element_click),
            )?);
            target.transition_listeners = ctx.shim.on_transition_end(
                stage,
                element,
                dispatch(&this, "transition end", ZoomTarget::on_transition_end),
            )?;
        }
        stage.set_binding_tag(element, Some(id));
        self.resolve_dimensions()
    }

    fn resolve_dimensions(&self) -> Result<(), ZoomError> {
        let (ctx, source) = {
            let target = self.inner.borrow();
            let stage = target.stage();
            let src = stage.attribute(&target.element, "src");
            let background = stage.style_property(&target.element, "background-image");
            (
                Rc::clone(&target.ctx),
                image_source(src.as_deref(), background.as_deref()),
            )
        };

        let Some(source) = source else {
            return self.inner.borrow_mut().settle_dimensions(None);
        };

        let pending = resolve_natural_size(ctx.stage(), Rc::downgrade(&self.inner), &source);
        ctx.stage().spawn(Box::pin(async move {
            let Resolved { target, size } = pending.await;
            let Some(target) = target.upgrade() else {
                log::debug!("Natural size for {source} arrived after unbind");
                return;
            };
            let natural = match size {
                Ok(size) => Some(size),
                Err(err) => {
                    log::debug!("Natural size unavailable: {err}");
                    None
                }
            };
            let Ok(mut target) = target.try_borrow_mut() else {
                log::warn!("Zoom target busy; dropping natural size for {source}");
                return;
            };
            if let Err(err) = target.settle_dimensions(natural) {
                log::warn!("Zoom target {} could not reserve layout: {err}", target.id);
            }
        }));
        Ok(())
    }

    pub fn id(&self) -> TargetId {
        self.inner.borrow().id
    }

    pub fn element(&self) -> S::Node {
        self.inner.borrow().element.clone()
    }

    pub fn wrapper(&self) -> S::Node {
        self.inner.borrow().wrapper.clone()
    }

    /// Copy of the options the target was bound with.
    pub fn config(&self) -> ZoomConfig {
        self.inner.borrow().config.clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.borrow().phase
    }

    /// Reads the `zoomed` marker on the element, not the internal phase.
    pub fn is_zoomed(&self) -> bool {
        self.inner.borrow().is_zoomed()
    }

    pub fn is_bound(&self) -> bool {
        self.inner.borrow().bound
    }

    pub fn is_ignoring_scroll(&self) -> bool {
        self.inner.borrow().ignoring_scroll
    }

    pub fn overlay(&self) -> Option<S::Node> {
        self.inner
            .borrow()
            .overlay
            .as_ref()
            .map(|overlay| overlay.node.clone())
    }

    pub fn fading_overlays(&self) -> Vec<S::Node> {
        self.inner
            .borrow()
            .fading
            .iter()
            .map(|fading| fading.node.clone())
            .collect()
    }

    pub fn filler(&self) -> Option<S::Node> {
        self.inner.borrow().filler.clone()
    }

    pub fn natural_size(&self) -> Option<Size> {
        self.inner.borrow().natural_size
    }

    pub fn is_listening_for_scroll(&self) -> bool {
        self.inner.borrow().scroll_listener.is_some()
    }

    /// Same as a click on the element.
    pub fn toggle(&self) -> Result<(), ZoomError> {
        let mut target = self.inner.borrow_mut();
        if !target.bound {
            return Err(ZoomError::NotBound);
        }
        target.on_element_click()
    }

    /// Force the zoom-out path, as an overlay click does.
    pub fn zoom_out(&self) -> Result<(), ZoomError> {
        let mut target = self.inner.borrow_mut();
        if !target.bound {
            return Err(ZoomError::NotBound);
        }
        if target.overlay.is_none() && !target.is_zoomed() {
            return Ok(());
        }
        target.zoom_out(Trigger::Api)
    }

    /// Release every listener and drop overlay ownership. The wrapper and
    /// filler stay in the document.
    pub fn unbind(&self) {
        self.inner.borrow_mut().unbind();
    }
}
