//! In-page zoom lightbox.
//!
//! A bound image (or background-image element) zooms to fit the viewport on
//! click and reverts on a second click, an overlay click or a page scroll.
//! Everything here is host-agnostic:
//! - `Stage` is the document the controller drives
//! - `CompatShim` hides vendor-prefixed transform and completion events
//!
//! The browser host lives in `zoomable-web`.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

pub mod compat;
pub mod config;
pub mod controller;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod layout;
pub mod page;
pub mod registry;
pub mod resolver;
pub mod source;
pub mod stage;

pub use compat::{CompatShim, PrefixedShim, StandardShim};
pub use config::ZoomConfig;
pub use controller::{Phase, Trigger, ZoomContext, Zoomable};
pub use error::ZoomError;
pub use fit::{compute_scale, compute_translate, FitTransform, Translate, VIEWPORT_MARGIN};
pub use geometry::{current_viewport, document_offset, Offset, Rect, ScrollMetrics, Size, ViewportMetrics};
pub use page::ZoomPage;
pub use registry::TransitionRegistry;
pub use stage::{Callback, ListenOn, Stage};

// ============================================================================
// CSS contract
// ============================================================================

/// Present on the target throughout any transition.
pub const ZOOMING: &str = "zooming";
pub const ZOOMING_IN: &str = "zooming-in";
pub const ZOOMING_OUT: &str = "zooming-out";
pub const ZOOMED: &str = "zoomed";
pub const ZOOM_OVERLAY: &str = "zoom-overlay";
pub const FADE_IN: &str = "fade-in";
pub const FADE_OUT: &str = "fade-out";
pub const MEDIA_PLACEHOLDER: &str = "media-placeholder";
pub const MEDIA_FILL: &str = "media-fill";
pub const MEDIA_IMAGE: &str = "media-image";

pub const DATA_WIDTH: &str = "data-width";
pub const DATA_HEIGHT: &str = "data-height";
pub const DATA_ACTUAL_WIDTH: &str = "data-actual-width";
pub const DATA_ACTUAL_HEIGHT: &str = "data-actual-height";

/// Elements bound automatically once the document is parsed.
pub const DEFAULT_SELECTOR: &str = "[data-action=zoom]";

// ============================================================================
// Target identity
// ============================================================================

static NEXT_TARGET_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(pub u32);

impl TargetId {
    pub fn next() -> Self {
        Self(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
