//! Scale and translation that center a target in the viewport.

use std::fmt;

use crate::geometry::{Offset, Size};

/// Inset kept between the zoomed image and each viewport edge, in CSS px.
pub const VIEWPORT_MARGIN: f64 = 20.0;

/// Smallest extent an axis is allowed to shrink to once margins are removed.
const MIN_AVAILABLE_EXTENT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Translate {
    pub x: f64,
    pub y: f64,
}

/// Translate first, then scale, with a zero z-translation so the engine
/// composites the element on its own layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    pub translate: Translate,
    pub scale: f64,
}

impl fmt::Display for FitTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}px, {}px) translateZ(0px) scale({})",
            self.translate.x, self.translate.y, self.scale
        )
    }
}

/// Uniform scale that fits `rendered` inside `viewport` minus `margin` on
/// every side. With `natural` given (and non-empty), the result is also
/// clamped so neither axis exceeds the image's natural resolution.
///
/// Returns `1.0` for a zero-sized element.
pub fn compute_scale(rendered: Size, viewport: Size, margin: f64, natural: Option<Size>) -> f64 {
    if rendered.is_empty() {
        return 1.0;
    }

    let available_width = (viewport.width - margin * 2.0).max(MIN_AVAILABLE_EXTENT);
    let available_height = (viewport.height - margin * 2.0).max(MIN_AVAILABLE_EXTENT);

    let mut scale_x = available_width / rendered.width;
    let mut scale_y = available_height / rendered.height;

    if let Some(natural) = natural.filter(|size| !size.is_empty()) {
        scale_x = scale_x.min(natural.width / rendered.width);
        scale_y = scale_y.min(natural.height / rendered.height);
    }

    scale_x.min(scale_y)
}

/// Delta moving the element's center onto the viewport's center. `offset` is
/// the element's document position; `scroll_y` the current vertical scroll.
pub fn compute_translate(rendered: Size, offset: Offset, viewport: Size, scroll_y: f64) -> Translate {
    let center_y = offset.top + rendered.height / 2.0 - scroll_y;
    let center_x = offset.left + rendered.width / 2.0;

    Translate {
        x: viewport.width / 2.0 - center_x,
        y: viewport.height / 2.0 - center_y,
    }
}

pub fn fit_transform(
    rendered: Size,
    offset: Offset,
    viewport: Size,
    scroll_y: f64,
    natural: Option<Size>,
) -> FitTransform {
    FitTransform {
        translate: compute_translate(rendered, offset, viewport, scroll_y),
        scale: compute_scale(rendered, viewport, VIEWPORT_MARGIN, natural),
    }
}
