//! Integration tests for SceneStateGuard driving a LightRoot through a scope frame
//!
//! Run with: cargo test --test lighting_integration_tests

use scope_compositor::glam::{Mat4, Vec4};
use scope_compositor::scope3d::host::{
    AmbientState, CameraId, CullFlag, CullingProcessId, Light, LightKind, LightRoot, LightState,
    SceneLighting, VisibilityCounters,
};
use scope_compositor::scope3d::lighting::SceneStateGuard;

fn culled(process: u32) -> LightState {
    LightState {
        cull_flag: CullFlag::Culled,
        occluded: true,
        temporary: false,
        dynamic: false,
        lod_dimmer: 0.25,
        camera: Some(CameraId(1)),
        culling_process: Some(CullingProcessId(process)),
    }
}

fn host_scene() -> LightRoot {
    let mut root = LightRoot::new();
    root.insert_light(0, Light { kind: LightKind::Directional, state: culled(1) });
    root.insert_light(0, Light { kind: LightKind::Point, state: culled(2) });
    root.insert_light(1, Light { kind: LightKind::Spot, state: culled(3) });
    root.set_visibility_counters(VisibilityCounters {
        visible_lights: 3,
        visible_shadow_lights: 1,
        active_shadow_maps: 1,
    });
    root.set_ambient_state(&AmbientState {
        color_table: [[Vec4::new(0.1, 0.2, 0.3, 1.0); 2]; 3],
        enable_flags: [true, false],
        transforms: [Mat4::from_scale(scope_compositor::glam::Vec3::splat(2.0)), Mat4::IDENTITY],
        specular_enabled: true,
    });
    root
}

#[test]
fn test_integration_scope_frame_round_trip() {
    let mut root = host_scene();
    let before_ambient = root.ambient_state();
    let keys: Vec<_> = root.light_lists().iter().flatten().copied().collect();

    let mut guard = SceneStateGuard::new();
    let backup = guard.backup_light_states(&root);
    assert_eq!(backup.updated, 3);

    // Scope pass: every light forced visible
    let applied = guard.apply_light_states_for_scope(&mut root, false, 64);
    assert_eq!(applied.updated, 3);
    for key in &keys {
        let light = root.light(*key).unwrap();
        assert_eq!(light.state.cull_flag, CullFlag::FullyVisible);
        assert!(!light.state.occluded);
        assert_eq!(light.state.lod_dimmer, 1.0);
        assert_eq!(light.state.dynamic, light.kind.is_dynamic());
    }

    // Host's own culling runs during the scope draw and scribbles ambient and counters
    root.set_visibility_counters(VisibilityCounters::default());
    root.set_ambient_state(&AmbientState::default());

    let restored = guard.restore_light_states(&mut root);
    assert_eq!(restored.updated, 3);
    assert_eq!(restored.skipped, 0);
    for (key, process) in keys.iter().zip(1..) {
        assert_eq!(root.light(*key).unwrap().state, culled(process));
    }
    assert_eq!(root.visibility_counters().visible_lights, 3);
    assert_eq!(root.ambient_state(), before_ambient);
}

#[test]
fn test_integration_light_deleted_during_scope_pass() {
    let mut root = host_scene();
    let keys: Vec<_> = root.light_lists().iter().flatten().copied().collect();

    let mut guard = SceneStateGuard::new();
    guard.backup_light_states(&root);
    guard.apply_light_states_for_scope(&mut root, false, 64);

    root.remove_light(keys[1]);
    root.prune_lists();

    let restored = guard.restore_light_states(&mut root);
    assert_eq!(restored.updated, 2);
    assert_eq!(restored.skipped, 1);
    assert_eq!(root.light(keys[0]).unwrap().state, culled(1));
    assert_eq!(root.light(keys[2]).unwrap().state, culled(3));
    assert_eq!(root.light_count(), 2);
}

#[test]
fn test_integration_limited_light_count() {
    let mut root = host_scene();
    let keys: Vec<_> = root.light_lists().iter().flatten().copied().collect();

    let mut guard = SceneStateGuard::new();
    guard.backup_light_states(&root);
    let applied = guard.apply_light_states_for_scope(&mut root, true, 2);

    assert_eq!(applied.updated, 2);
    assert_eq!(root.light(keys[0]).unwrap().state.cull_flag, CullFlag::FullyVisible);
    assert_eq!(root.light(keys[1]).unwrap().state.cull_flag, CullFlag::FullyVisible);
    assert_eq!(root.light(keys[2]).unwrap().state, culled(3));

    guard.restore_light_states(&mut root);
    assert_eq!(root.light(keys[0]).unwrap().state, culled(1));
}
