/// FrustumPlanes — six planes derived from a camera's world axes.
///
/// Each plane stores an inward-pointing unit normal and a constant so that
/// `dot(normal, p) - constant` is the signed distance of `p`, positive inside.

use glam::Vec3;
use crate::camera::{CameraState, ViewVolume};
use crate::config::ScopeRegion;

/// Frustum plane indices
pub const PLANE_NEAR: usize = 0;
pub const PLANE_FAR: usize = 1;
pub const PLANE_LEFT: usize = 2;
pub const PLANE_RIGHT: usize = 3;
pub const PLANE_TOP: usize = 4;
pub const PLANE_BOTTOM: usize = 5;

/// A plane with an inward normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    /// Plane through `point` with the given (not necessarily unit) inward normal
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self { normal, constant: normal.dot(point) }
    }

    /// Signed distance, positive on the inner side
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.constant
    }
}

/// Bounding sphere of a scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Result of a sphere test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundVisibility {
    PotentiallyVisible,
    Outside,
}

/// Six planes plus an activity mask (near, far, left, right, top, bottom)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumPlanes {
    pub planes: [Plane; 6],
    pub active: [bool; 6],
}

/// Extents of the view volume restricted to `region`, grown by `margin`
fn restrict_extents(volume: &ViewVolume, region: &ScopeRegion, margin: f32) -> (f32, f32, f32, f32) {
    let radius = region.radius * (1.0 + margin.max(0.0));
    let u0 = (region.center_u - radius).clamp(0.0, 1.0);
    let u1 = (region.center_u + radius).clamp(0.0, 1.0);
    let v0 = (region.center_v - radius).clamp(0.0, 1.0);
    let v1 = (region.center_v + radius).clamp(0.0, 1.0);

    let width = volume.right - volume.left;
    let height = volume.top - volume.bottom;
    (
        volume.left + width * u0,
        volume.left + width * u1,
        volume.top - height * v0,
        volume.top - height * v1,
    )
}

impl FrustumPlanes {
    /// Derive planes from the camera's forward/up/right axes and view volume.
    ///
    /// With a region, the side planes enclose only that normalized
    /// sub-rectangle (grown by `margin`). The far plane is inactive when the
    /// volume has no finite far distance beyond near.
    pub fn from_camera(camera: &CameraState, region: Option<&ScopeRegion>, margin: f32) -> Self {
        let volume = &camera.view_volume;
        let (left, right, top, bottom) = match region {
            Some(region) => restrict_extents(volume, region, margin),
            None => (volume.left, volume.right, volume.top, volume.bottom),
        };

        let forward = camera.forward().normalize_or_zero();
        let up = camera.up().normalize_or_zero();
        let side = camera.right().normalize_or_zero();
        let eye = camera.position;
        let near = volume.near;
        let eye_depth = forward.dot(eye);

        let planes = [
            Plane { normal: forward, constant: eye_depth + near },
            Plane { normal: -forward, constant: -(eye_depth + volume.far) },
            Plane::from_normal_and_point(side * near - forward * left, eye),
            Plane::from_normal_and_point(forward * right - side * near, eye),
            Plane::from_normal_and_point(forward * top - up * near, eye),
            Plane::from_normal_and_point(up * near - forward * bottom, eye),
        ];

        let mut active = [true; 6];
        active[PLANE_FAR] = volume.far.is_finite() && volume.far > near;

        Self { planes, active }
    }

    /// Sphere test.
    ///
    /// `Outside` if, for any active plane, `dot(normal, center) - constant < -radius`.
    /// Spheres with radius <= 0 are always potentially visible.
    pub fn test_sphere(&self, bound: &BoundingSphere) -> BoundVisibility {
        if bound.radius <= 0.0 {
            return BoundVisibility::PotentiallyVisible;
        }
        let outside = self.planes.iter()
            .zip(self.active.iter())
            .any(|(plane, active)| *active && plane.signed_distance(bound.center) < -bound.radius);
        if outside {
            BoundVisibility::Outside
        } else {
            BoundVisibility::PotentiallyVisible
        }
    }
}

#[cfg(test)]
#[path = "frustum_planes_tests.rs"]
mod tests;
