//! Binding API: discovers targets on a page and keeps their controllers
//! reachable by element.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::compat::CompatShim;
use crate::config::{ZoomConfig, OPTIONS_ATTRIBUTE};
use crate::controller::{ZoomContext, Zoomable};
use crate::stage::Stage;
use crate::{TargetId, ZoomError};

pub struct ZoomPage<S: Stage> {
    ctx: Rc<ZoomContext<S>>,
    defaults: ZoomConfig,
    targets: BTreeMap<TargetId, Zoomable<S>>,
}

impl<S: Stage> ZoomPage<S> {
    pub fn new(stage: S, shim: impl CompatShim<S> + 'static, defaults: ZoomConfig) -> Self {
        Self::with_context(ZoomContext::new(stage, shim), defaults)
    }

    pub fn with_context(ctx: Rc<ZoomContext<S>>, defaults: ZoomConfig) -> Self {
        Self {
            ctx,
            defaults,
            targets: BTreeMap::new(),
        }
    }

    pub fn context(&self) -> &Rc<ZoomContext<S>> {
        &self.ctx
    }

    pub fn defaults(&self) -> &ZoomConfig {
        &self.defaults
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> impl Iterator<Item = &Zoomable<S>> {
        self.targets.values()
    }

    /// Bind one element with an explicit config.
    pub fn bind(&mut self, node: S::Node, config: ZoomConfig) -> Result<Zoomable<S>, ZoomError> {
        let zoomable = Zoomable::bind(&self.ctx, node, config)?;
        self.targets.insert(zoomable.id(), zoomable.clone());
        Ok(zoomable)
    }

    /// Effective config for `node`: `base` layered with the element's
    /// `data-zoom-options`, when present.
    pub fn config_for(&self, node: &S::Node, base: &ZoomConfig) -> Result<ZoomConfig, ZoomError> {
        match self.ctx.stage().attribute(node, OPTIONS_ATTRIBUTE) {
            Some(raw) if !raw.trim().is_empty() => base.merged_with(&raw),
            _ => Ok(base.clone()),
        }
    }

    /// Bind every unbound match of `selector` using the page defaults.
    pub fn bind_selector(&mut self, selector: &str) -> Result<usize, ZoomError> {
        let defaults = self.defaults.clone();
        self.bind_selector_with(selector, &defaults)
    }

    /// Bind every unbound match of `selector`. Elements that fail to bind are
    /// logged and skipped. Returns how many were newly bound.
    pub fn bind_selector_with(&mut self, selector: &str, base: &ZoomConfig) -> Result<usize, ZoomError> {
        let nodes = self.ctx.stage().query_all(selector)?;
        let mut bound = 0;

        for node in nodes {
            if self.lookup(&node).is_some() {
                continue;
            }
            let config = match self.config_for(&node, base) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!("Skipping {node:?}: {err}");
                    continue;
                }
            };
            match self.bind(node, config) {
                Ok(_) => bound += 1,
                Err(err) => log::warn!("Could not bind zoom target: {err}"),
            }
        }

        log::info!("Bound {bound} zoom targets for {selector}");
        Ok(bound)
    }

    pub fn lookup(&self, node: &S::Node) -> Option<Zoomable<S>> {
        let id = self.ctx.stage().binding_tag(node)?;
        self.targets.get(&id).cloned()
    }

    pub fn get(&self, id: TargetId) -> Option<Zoomable<S>> {
        self.targets.get(&id).cloned()
    }

    pub fn unbind(&mut self, node: &S::Node) -> Result<(), ZoomError> {
        let id = self.ctx.stage().binding_tag(node).ok_or(ZoomError::NotBound)?;
        let zoomable = self.targets.remove(&id).ok_or(ZoomError::NotBound)?;
        zoomable.unbind();
        Ok(())
    }

    pub fn unbind_selector(&mut self, selector: &str) -> Result<usize, ZoomError> {
        let nodes = self.ctx.stage().query_all(selector)?;
        Ok(nodes
            .iter()
            .filter(|node| self.unbind(node).is_ok())
            .count())
    }

    pub fn unbind_all(&mut self) -> usize {
        let targets = std::mem::take(&mut self.targets);
        for zoomable in targets.values() {
            zoomable.unbind();
        }
        targets.len()
    }
}
