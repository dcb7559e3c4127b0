//! Natural-size resolution for a target's image.

use std::future::Future;

use crate::geometry::Size;
use crate::stage::Stage;
use crate::ZoomError;

/// Outcome of a probe, handed back together with the target it was issued
/// for.
#[derive(Debug)]
pub struct Resolved<T> {
    pub target: T,
    pub size: Result<Size, ZoomError>,
}

/// Probe `source` through the host and hand `target` back alongside the
/// result. The returned future does not borrow `stage`.
pub fn resolve_natural_size<S, T>(
    stage: &S,
    target: T,
    source: &str,
) -> impl Future<Output = Resolved<T>> + 'static
where
    S: Stage,
    T: 'static,
{
    let probe = stage.probe_natural_size(source);
    let source = source.to_string();
    async move {
        let size = probe.await.and_then(|size| {
            if size.is_empty() {
                Err(ZoomError::ImageLoad(format!("{source} has no intrinsic size")))
            } else {
                Ok(size)
            }
        });
        Resolved { target, size }
    }
}
