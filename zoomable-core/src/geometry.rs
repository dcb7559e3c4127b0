//! Viewport and document-position measurement. Pure functions over raw
//! numbers the host reads; nothing here touches a document.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Position in full-document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub top: f64,
    pub left: f64,
}

/// Bounding box relative to the viewport, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Raw viewport readings. `inner` is `None` when the host exposes no
/// browsing-context size (or it is not a number yet).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportMetrics {
    pub client: Size,
    pub inner: Option<Size>,
}

/// Scroll positions as reported by the document root and by the body.
/// Engines disagree on which one carries the page scroll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub root: Offset,
    pub body: Offset,
    pub window_y: f64,
}

impl ScrollMetrics {
    pub fn effective(&self) -> Offset {
        Offset {
            top: first_nonzero(self.root.top, self.body.top),
            left: first_nonzero(self.root.left, self.body.left),
        }
    }
}

fn first_nonzero(primary: f64, fallback: f64) -> f64 {
    if primary != 0.0 && primary.is_finite() {
        primary
    } else if fallback.is_finite() {
        fallback
    } else {
        0.0
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Larger of the document-root client box and the browsing-context inner
/// size, per axis. Never negative.
pub fn current_viewport(metrics: &ViewportMetrics) -> Size {
    let inner = metrics.inner.unwrap_or_default();
    Size {
        width: non_negative(metrics.client.width).max(non_negative(inner.width)),
        height: non_negative(metrics.client.height).max(non_negative(inner.height)),
    }
}

/// Top-left of `rect` in document coordinates.
pub fn document_offset(rect: &Rect, scroll: &ScrollMetrics) -> Offset {
    let scroll = scroll.effective();
    Offset {
        top: rect.top + scroll.top,
        left: rect.left + scroll.left,
    }
}
