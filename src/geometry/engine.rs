//! Geometry engine: kernel plus cache.

use std::sync::Arc;

use tracing::{debug, warn};

use super::cache::{CachedShape, ShapeCache};
use super::kernel::{GeometryKernel, GeometrySettings, SectionPlane, Segment3};
use super::polyhedral::PolyhedralKernel;
use super::Shape;
use crate::error::Issue;
use crate::model::FilteredElement;

/// Builds element shapes through a kernel, sharing them across storeys.
pub struct GeometryEngine {
    kernel: Arc<dyn GeometryKernel>,
    settings: GeometrySettings,
    cache: Option<ShapeCache>,
}

impl GeometryEngine {
    pub fn new(kernel: Arc<dyn GeometryKernel>, settings: GeometrySettings, cache_enabled: bool) -> Self {
        Self {
            kernel,
            settings,
            cache: cache_enabled.then(ShapeCache::new),
        }
    }

    /// Engine over the built-in polyhedral kernel.
    pub fn polyhedral(settings: GeometrySettings, cache_enabled: bool) -> Self {
        Self::new(Arc::new(PolyhedralKernel::new()), settings, cache_enabled)
    }

    pub fn kernel_name(&self) -> &str {
        self.kernel.name()
    }

    pub fn settings(&self) -> &GeometrySettings {
        &self.settings
    }

    /// Shape of one element. A failure is returned as a recoverable
    /// `ShapeConstructionFailed` issue.
    pub fn get_shape(&self, element: &FilteredElement<'_>) -> CachedShape {
        match &self.cache {
            Some(cache) => cache.get_or_build(element.guid(), || self.build(element)),
            None => self.build(element),
        }
    }

    /// Intersect a shape with a plane through the kernel.
    pub fn section(&self, shape: &Shape, plane: &SectionPlane) -> Result<Vec<Segment3>, Issue> {
        self.kernel
            .intersect_with_plane(shape, plane)
            .map_err(|e| Issue::section_failed(&shape.guid, e))
    }

    /// Number of cached entries, zero when caching is off.
    pub fn cached_shapes(&self) -> usize {
        self.cache.as_ref().map_or(0, ShapeCache::len)
    }

    fn build(&self, element: &FilteredElement<'_>) -> CachedShape {
        let guid = element.guid();
        match self.kernel.build_shape(element.element, &self.settings) {
            Ok(shape) => {
                debug!(
                    "Built shape for {} ({}): {} faces",
                    guid,
                    element.class,
                    shape.face_count()
                );
                Ok(Arc::new(shape))
            }
            Err(e) => {
                warn!("Shape construction failed for {}: {}", guid, e);
                Err(Issue::shape_construction_failed(guid, e))
            }
        }
    }
}

impl std::fmt::Debug for GeometryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryEngine")
            .field("kernel", &self.kernel.name())
            .field("settings", &self.settings)
            .field("cache", &self.cache)
            .finish()
    }
}
