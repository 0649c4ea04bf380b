//! Culling module — secondary visibility test for the scope pass.
//!
//! The host culls against the camera it renders from. These planes let
//! draw-call filters reject objects outside the scope view (or a
//! sub-rectangle of it) before they reach the scope draw.

mod frustum_culler;
mod frustum_planes;

pub use frustum_culler::{AuxiliaryFrustumCuller, CullStats};
pub use frustum_planes::{
    BoundVisibility, BoundingSphere, FrustumPlanes, Plane,
    PLANE_NEAR, PLANE_FAR, PLANE_LEFT, PLANE_RIGHT, PLANE_TOP, PLANE_BOTTOM,
};
