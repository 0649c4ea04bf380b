/// AuxiliaryFrustumCuller — per-frame plane cache and draw-call filter.
///
/// The orchestrator refreshes the cached planes once per frame from the
/// scope camera and invalidates them when the scope pass ends. Draw-call
/// filters call `should_draw()` for every object they might forward into
/// the scope draw.

use std::sync::atomic::{AtomicU64, Ordering};
use glam::Vec3;
use crate::camera::CameraState;
use crate::config::{CompositorConfig, ScopeRegion};
use super::frustum_planes::{BoundVisibility, BoundingSphere, FrustumPlanes};

/// Counters accumulated since the last `take_stats()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CullStats {
    pub tested: u64,
    pub passed: u64,
    pub filtered: u64,
}

/// Planes cached for one frame
#[derive(Debug, Clone, Copy)]
struct CachedPlanes {
    planes: FrustumPlanes,
    frame_index: u64,
}

/// Secondary visibility test for the scope pass
#[derive(Debug)]
pub struct AuxiliaryFrustumCuller {
    cached: Option<CachedPlanes>,
    margin: f32,
    region: Option<ScopeRegion>,
    shadow_caster_range: f32,
    tested: AtomicU64,
    passed: AtomicU64,
    filtered: AtomicU64,
}

impl AuxiliaryFrustumCuller {
    pub fn new(config: &CompositorConfig) -> Self {
        Self {
            cached: None,
            margin: config.culling_margin,
            region: config.scope_region,
            shadow_caster_range: config.shadow_caster_range,
            tested: AtomicU64::new(0),
            passed: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
        }
    }

    /// Derive and cache the planes of `camera` for `frame_index`
    pub fn update_cached_frustum_planes(&mut self, camera: &CameraState, frame_index: u64) {
        let planes = FrustumPlanes::from_camera(camera, self.region.as_ref(), self.margin);
        self.cached = Some(CachedPlanes { planes, frame_index });
    }

    /// Drop the cached planes
    pub fn invalidate_cached_frustum_planes(&mut self) {
        self.cached = None;
    }

    /// Planes cached for `frame_index`, `None` if missing or from another frame
    pub fn cached_planes(&self, frame_index: u64) -> Option<&FrustumPlanes> {
        self.cached.as_ref()
            .filter(|cached| cached.frame_index == frame_index)
            .map(|cached| &cached.planes)
    }

    /// Whether any planes are cached, for any frame
    pub fn has_cached_planes(&self) -> bool {
        self.cached.is_some()
    }

    pub fn test_bound_against_frustum(bound: &BoundingSphere, planes: &FrustumPlanes) -> BoundVisibility {
        planes.test_sphere(bound)
    }

    /// Draw-call filter entry point.
    ///
    /// Without planes for `frame_index` the object is let through: filtering
    /// against stale planes could drop geometry the scope camera sees.
    pub fn should_draw(&self, bound: &BoundingSphere, frame_index: u64) -> bool {
        let Some(planes) = self.cached_planes(frame_index) else {
            crate::scope_warn!("scope::AuxiliaryFrustumCuller",
                "No planes cached for frame {}, object not filtered", frame_index);
            return true;
        };

        self.tested.fetch_add(1, Ordering::Relaxed);
        match Self::test_bound_against_frustum(bound, planes) {
            BoundVisibility::PotentiallyVisible => {
                self.passed.fetch_add(1, Ordering::Relaxed);
                true
            }
            BoundVisibility::Outside => {
                self.filtered.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Whether a shadow caster is close enough to `eye` to be drawn in the scope pass.
    /// The range is measured to the nearest point of the sphere.
    pub fn is_shadow_caster_in_range(&self, bound: &BoundingSphere, eye: Vec3) -> bool {
        let distance = bound.center.distance(eye) - bound.radius.max(0.0);
        distance <= self.shadow_caster_range
    }

    /// Read and reset the counters
    pub fn take_stats(&self) -> CullStats {
        CullStats {
            tested: self.tested.swap(0, Ordering::Relaxed),
            passed: self.passed.swap(0, Ordering::Relaxed),
            filtered: self.filtered.swap(0, Ordering::Relaxed),
        }
    }

    /// Read the counters without resetting them
    pub fn peek_stats(&self) -> CullStats {
        CullStats {
            tested: self.tested.load(Ordering::Relaxed),
            passed: self.passed.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[path = "frustum_culler_tests.rs"]
mod tests;
