//! Wrapper and filler nodes that keep the page from jumping while an image
//! loads.

use crate::geometry::Size;
use crate::stage::Stage;
use crate::{
    ZoomError, DATA_ACTUAL_HEIGHT, DATA_ACTUAL_WIDTH, DATA_HEIGHT, DATA_WIDTH, MEDIA_FILL,
    MEDIA_IMAGE, MEDIA_PLACEHOLDER,
};

/// Wrap `element` in a `media-placeholder` container occupying the element's
/// original slot.
pub fn wrap<S: Stage>(stage: &S, element: &S::Node) -> Result<S::Node, ZoomError> {
    let parent = stage.parent(element).ok_or(ZoomError::Detached)?;

    let wrapper = stage.create_element("div")?;
    stage.add_class(&wrapper, MEDIA_PLACEHOLDER);
    stage.insert_before(&parent, &wrapper, Some(element))?;
    stage.insert_before(&wrapper, element, None)?;

    Ok(wrapper)
}

/// Undo `wrap`: put `element` back in the wrapper's slot and drop the
/// wrapper.
pub fn unwrap<S: Stage>(stage: &S, element: &S::Node, wrapper: &S::Node) {
    if let Some(parent) = stage.parent(wrapper) {
        if let Err(err) = stage.insert_before(&parent, element, Some(wrapper)) {
            log::warn!("Could not restore element to its slot: {err}");
        }
    }
    stage.detach(wrapper);
}

/// Footprint the filler reserves. A box that has width but no height yet
/// (image still loading) takes its height from the natural aspect ratio.
pub fn filler_size(rendered: Size, natural: Option<Size>) -> Size {
    match natural.filter(|size| !size.is_empty()) {
        Some(natural) if rendered.width > 0.0 && rendered.height <= 0.0 => Size {
            width: rendered.width,
            height: rendered.width * natural.height / natural.width,
        },
        _ => rendered,
    }
}

/// Insert a `media-fill` node right before `element` and record the
/// rendered (and, when known, natural) dimensions on it.
pub fn insert_filler<S: Stage>(
    stage: &S,
    element: &S::Node,
    rendered: Size,
    natural: Option<Size>,
) -> Result<S::Node, ZoomError> {
    let parent = stage.parent(element).ok_or(ZoomError::Detached)?;
    let footprint = filler_size(rendered, natural);

    let filler = stage.create_element("div")?;
    stage.add_class(&filler, MEDIA_FILL);
    stage.set_style_property(&filler, "width", &format!("{}px", footprint.width));
    stage.set_style_property(&filler, "height", &format!("{}px", footprint.height));
    stage.insert_before(&parent, &filler, Some(element))?;

    stage.set_attribute(element, DATA_WIDTH, &rendered.width.to_string());
    stage.set_attribute(element, DATA_HEIGHT, &rendered.height.to_string());
    if let Some(natural) = natural {
        stage.set_attribute(element, DATA_ACTUAL_WIDTH, &natural.width.to_string());
        stage.set_attribute(element, DATA_ACTUAL_HEIGHT, &natural.height.to_string());
    }
    stage.add_class(element, MEDIA_IMAGE);

    Ok(filler)
}
