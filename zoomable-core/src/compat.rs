//! Vendor-prefix handling for transform writes and transition/animation
//! completion events.

use crate::stage::{Callback, ListenOn, Stage};
use crate::ZoomError;

/// Transform property names, most specific first.
pub const TRANSFORM_PROPERTIES: [&str; 5] = [
    "-webkit-transform",
    "-moz-transform",
    "-ms-transform",
    "-o-transform",
    "transform",
];

pub const TRANSITION_END_EVENTS: [&str; 5] = [
    "webkitTransitionEnd",
    "mozTransitionEnd",
    "MSTransitionEnd",
    "oTransitionEnd",
    "transitionend",
];

/// Style property probed for support, and the animation-end event it implies.
/// Checked in order.
pub const ANIMATION_END_EVENTS: [(&str, &str); 4] = [
    ("animation", "animationend"),
    ("OAnimation", "oanimationend"),
    ("MSAnimation", "MSAnimationEnd"),
    ("WebkitAnimation", "webkitAnimationEnd"),
];

pub const STANDARD_ANIMATION_END: &str = "animationend";

pub trait CompatShim<S: Stage> {
    fn write_transform(&self, stage: &S, node: &S::Node, value: &str);

    fn on_transition_end(
        &self,
        stage: &S,
        node: &S::Node,
        callback: Callback,
    ) -> Result<Vec<S::Listener>, ZoomError>;

    fn on_animation_end(
        &self,
        stage: &S,
        node: &S::Node,
        callback: Callback,
    ) -> Result<Vec<S::Listener>, ZoomError>;
}

/// Unprefixed names only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardShim;

impl<S: Stage> CompatShim<S> for StandardShim {
    fn write_transform(&self, stage: &S, node: &S::Node, value: &str) {
        stage.set_style_property(node, "transform", value);
    }

    fn on_transition_end(
        &self,
        stage: &S,
        node: &S::Node,
        callback: Callback,
    ) -> Result<Vec<S::Listener>, ZoomError> {
        Ok(vec![stage.listen(ListenOn::Node(node), "transitionend", callback)?])
    }

    fn on_animation_end(
        &self,
        stage: &S,
        node: &S::Node,
        callback: Callback,
    ) -> Result<Vec<S::Listener>, ZoomError> {
        Ok(vec![stage.listen(
            ListenOn::Node(node),
            STANDARD_ANIMATION_END,
            callback,
        )?])
    }
}

/// Writes every prefixed transform property and listens under every prefixed
/// transition-end name, for engines that predate the unprefixed ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixedShim {
    animation_end: String,
}

impl PrefixedShim {
    pub fn new(animation_end: impl Into<String>) -> Self {
        Self {
            animation_end: animation_end.into(),
        }
    }

    /// Pick the animation-end event from whichever animation style property
    /// the engine recognizes.
    pub fn detect(supports_style: impl Fn(&str) -> bool) -> Self {
        let animation_end = ANIMATION_END_EVENTS
            .iter()
            .find(|(property, _)| supports_style(property))
            .map(|(_, event)| *event)
            .unwrap_or(STANDARD_ANIMATION_END);
        Self::new(animation_end)
    }

    pub fn animation_end(&self) -> &str {
        &self.animation_end
    }
}

impl<S: Stage> CompatShim<S> for PrefixedShim {
    fn write_transform(&self, stage: &S, node: &S::Node, value: &str) {
        for property in TRANSFORM_PROPERTIES {
            stage.set_style_property(node, property, value);
        }
    }

    fn on_transition_end(
        &self,
        stage: &S,
        node: &S::Node,
        callback: Callback,
    ) -> Result<Vec<S::Listener>, ZoomError> {
        TRANSITION_END_EVENTS
            .iter()
            .map(|event| stage.listen(ListenOn::Node(node), event, callback.clone()))
            .collect()
    }

    fn on_animation_end(
        &self,
        stage: &S,
        node: &S::Node,
        callback: Callback,
    ) -> Result<Vec<S::Listener>, ZoomError> {
        Ok(vec![stage.listen(
            ListenOn::Node(node),
            &self.animation_end,
            callback,
        )?])
    }
}
