//! Integration tests for the auxiliary frustum culler
//!
//! Run with: cargo test --test culling_integration_tests

use scope_compositor::glam::Vec3;
use scope_compositor::scope3d::{CompositorConfig, ScopeRegion};
use scope_compositor::scope3d::camera::{reconfigure_view_volume, CameraState, ViewVolume};
use scope_compositor::scope3d::culling::{AuxiliaryFrustumCuller, BoundVisibility, BoundingSphere};

fn primary_camera() -> CameraState {
    CameraState::new(Vec3::ZERO, ViewVolume::from_fov(90.0, 1.0, 1.0, 1000.0))
}

#[test]
fn test_integration_cull_pass_counts() {
    let mut culler = AuxiliaryFrustumCuller::new(&CompositorConfig::default());
    culler.update_cached_frustum_planes(&primary_camera(), 1);

    let bounds = [
        BoundingSphere::new(Vec3::new(0.0, 50.0, 0.0), 1.0),
        BoundingSphere::new(Vec3::new(0.0, -50.0, 0.0), 1.0),
        BoundingSphere::new(Vec3::new(0.0, 2000.0, 0.0), 1.0),
        BoundingSphere::new(Vec3::new(5.0, 20.0, -3.0), 0.5),
    ];
    let drawn = bounds.iter().filter(|b| culler.should_draw(b, 1)).count();

    assert_eq!(drawn, 2);
    let stats = culler.take_stats();
    assert_eq!(stats.tested, 4);
    assert_eq!(stats.passed, 2);
    assert_eq!(stats.filtered, 2);
    assert_eq!(culler.peek_stats().tested, 0);
}

#[test]
fn test_integration_narrow_scope_view_rejects_periphery() {
    let primary = primary_camera();
    let mut scope = primary;
    scope.view_volume = reconfigure_view_volume(&primary.view_volume, 10.0, primary.pitch_degrees());

    let mut culler = AuxiliaryFrustumCuller::new(&CompositorConfig::default());
    culler.update_cached_frustum_planes(&scope, 7);
    let planes = *culler.cached_planes(7).unwrap();

    // 30 degrees off axis: inside the primary view, outside the scope view
    let peripheral = BoundingSphere::new(Vec3::new(30.0, 52.0, 0.0), 1.0);
    let centered = BoundingSphere::new(Vec3::new(0.0, 52.0, 0.0), 1.0);

    assert_eq!(
        AuxiliaryFrustumCuller::test_bound_against_frustum(&peripheral, &planes),
        BoundVisibility::Outside
    );
    assert_eq!(
        AuxiliaryFrustumCuller::test_bound_against_frustum(&centered, &planes),
        BoundVisibility::PotentiallyVisible
    );
}

#[test]
fn test_integration_region_restricts_culling() {
    let config = CompositorConfig {
        scope_region: Some(ScopeRegion { center_u: 0.5, center_v: 0.5, radius: 0.1 }),
        culling_margin: 0.0,
        ..CompositorConfig::default()
    };
    let mut with_region = AuxiliaryFrustumCuller::new(&config);
    let mut without_region = AuxiliaryFrustumCuller::new(&CompositorConfig::default());
    with_region.update_cached_frustum_planes(&primary_camera(), 3);
    without_region.update_cached_frustum_planes(&primary_camera(), 3);

    let off_center = BoundingSphere::new(Vec3::new(30.0, 100.0, 0.0), 1.0);

    assert!(without_region.should_draw(&off_center, 3));
    assert!(!with_region.should_draw(&off_center, 3));
}

#[test]
fn test_integration_stale_planes_never_filter() {
    let mut culler = AuxiliaryFrustumCuller::new(&CompositorConfig::default());
    culler.update_cached_frustum_planes(&primary_camera(), 1);

    let behind = BoundingSphere::new(Vec3::new(0.0, -50.0, 0.0), 1.0);
    assert!(!culler.should_draw(&behind, 1));
    assert!(culler.should_draw(&behind, 2));

    culler.invalidate_cached_frustum_planes();
    assert!(culler.should_draw(&behind, 1));
}

#[test]
fn test_integration_shadow_caster_range() {
    let config = CompositorConfig { shadow_caster_range: 100.0, ..CompositorConfig::default() };
    let culler = AuxiliaryFrustumCuller::new(&config);
    let eye = Vec3::new(10.0, 0.0, 0.0);

    assert!(culler.is_shadow_caster_in_range(&BoundingSphere::new(Vec3::new(10.0, 50.0, 0.0), 1.0), eye));
    assert!(culler.is_shadow_caster_in_range(&BoundingSphere::new(Vec3::new(10.0, 105.0, 0.0), 10.0), eye));
    assert!(!culler.is_shadow_caster_in_range(&BoundingSphere::new(Vec3::new(10.0, 300.0, 0.0), 10.0), eye));
}
