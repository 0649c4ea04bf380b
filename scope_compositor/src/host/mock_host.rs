/// Mock host renderer for unit tests (no GPU required)
///
/// The mock device keeps every texture as CPU pixels plus a stencil plane and
/// executes the compositor's fragment programs on them, so merge and restore
/// behaviour can be checked texel by texel.

use std::sync::Arc;
use glam::{Vec3, Vec4};
use rustc_hash::FxHashMap;
use crate::camera::{CameraState, ViewVolume};
use crate::error::{Error, Result};
use super::{
    AmbientState, CameraId, CullFlag, CullingProcessId, FrameTargets, GraphicsDevice,
    HostRenderer, Light, LightKey, LightKind, LightRoot, LightState, OutputSlot,
    PipelineState, RenderTargetId, SceneLighting, ScopeGeometry, ShaderProgram,
    StencilMergeConstants, Texture, TextureDesc, TextureFormat, TextureId, TextureInfo,
    TextureUsage, ViewProjection, VisibilityCounters,
};

/// Color the mock world draw writes into every shared target
pub const SECONDARY_COLOR: [f32; 4] = [0.25, 0.5, 0.75, 1.0];

/// Sentinel the mock world draw writes inside the scope region
pub const MOCK_SENTINEL: u8 = 0x7F;

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub id: TextureId,
    pub info: TextureInfo,
    pub name: String,
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn id(&self) -> TextureId {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub color: Vec<[f32; 4]>,
    pub depth: Vec<f32>,
    pub stencil: Vec<u8>,
}

impl Surface {
    fn new(width: u32, height: u32) -> Self {
        let len = (width * height) as usize;
        Self {
            width,
            height,
            color: vec![[0.0; 4]; len],
            depth: vec![1.0; len],
            stencil: vec![0; len],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y.min(self.height.saturating_sub(1)) * self.width + x.min(self.width.saturating_sub(1))) as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDraw {
    pub index_count: u32,
    pub first_index: u32,
    pub vertex_offset: i32,
    pub program: Option<ShaderProgram>,
    pub target: Option<TextureId>,
    pub resources: Vec<TextureId>,
    pub viewport_width: f32,
}

// ============================================================================
// Mock Device
// ============================================================================

#[derive(Debug, Default)]
pub struct MockDevice {
    next_id: u64,
    pub surfaces: FxHashMap<TextureId, Surface>,
    pub state: PipelineState,
    pub constants: Vec<u8>,
    pub commands: Vec<String>,
    pub indexed_draws: Vec<IndexedDraw>,
    pub fail_create: bool,
    pub created: u32,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make_texture(&mut self, name: &str, width: u32, height: u32, format: TextureFormat) -> Arc<dyn Texture> {
        self.next_id += 1;
        let id = TextureId(self.next_id);
        self.surfaces.insert(id, Surface::new(width, height));
        Arc::new(MockTexture {
            id,
            info: TextureInfo { width, height, format, usage: TextureUsage::SampledAndRenderTarget },
            name: name.to_string(),
        })
    }

    pub fn surface(&self, texture: &Arc<dyn Texture>) -> &Surface {
        &self.surfaces[&texture.id()]
    }

    pub fn surface_mut(&mut self, texture: &Arc<dyn Texture>) -> &mut Surface {
        self.surfaces.get_mut(&texture.id()).expect("unknown mock texture")
    }

    pub fn fill(&mut self, texture: &Arc<dyn Texture>, color: [f32; 4]) {
        self.surface_mut(texture).color.iter_mut().for_each(|c| *c = color);
    }

    pub fn pixel(&self, texture: &Arc<dyn Texture>, x: u32, y: u32) -> [f32; 4] {
        let surface = self.surface(texture);
        surface.color[surface.index(x, y)]
    }

    pub fn stencil(&self, texture: &Arc<dyn Texture>, x: u32, y: u32) -> u8 {
        let surface = self.surface(texture);
        surface.stencil[surface.index(x, y)]
    }

    /// Write `value` into the stencil plane inside [x0, x1) x [y0, y1)
    pub fn write_stencil_rect(&mut self, texture: &Arc<dyn Texture>, rect: (u32, u32, u32, u32), value: u8) {
        let surface = self.surface_mut(texture);
        let (x0, y0, x1, y1) = rect;
        for y in y0..y1.min(surface.height) {
            for x in x0..x1.min(surface.width) {
                let i = (y * surface.width + x) as usize;
                surface.stencil[i] = value;
            }
        }
    }

    fn resource(&self, slot: usize) -> Result<Surface> {
        let texture = self.state.shader_resources.get(slot)
            .ok_or_else(|| Error::InvalidResource(format!("no shader resource in slot {}", slot)))?;
        self.surfaces.get(&texture.id()).cloned()
            .ok_or_else(|| Error::InvalidResource(format!("unknown texture {}", texture.id())))
    }

    fn fullscreen(&mut self) -> Result<()> {
        let target = self.state.render_targets.first().cloned()
            .ok_or_else(|| Error::InvalidResource("no render target bound".to_string()))?;
        let program = self.state.program
            .ok_or_else(|| Error::InvalidResource("no program bound".to_string()))?;
        let (width, height) = target.info().extent();

        let stencil_plane = match (&self.state.depth_stencil.stencil, &self.state.depth_stencil_view) {
            (Some(test), Some(view)) => {
                let surface = self.surfaces[&view.id()].clone();
                if (surface.width, surface.height) != (width, height) {
                    return Err(Error::SizeMismatch {
                        resource: "depth-stencil view".to_string(),
                        expected: (width, height),
                        actual: (surface.width, surface.height),
                    });
                }
                Some((*test, surface))
            }
            _ => None,
        };

        let source = self.resource(0)?;
        let merge = if program == ShaderProgram::StencilResolveMerge {
            let constants: StencilMergeConstants = bytemuck::try_pod_read_unaligned(&self.constants)
                .map_err(|_| Error::InvalidResource("bad merge constants".to_string()))?;
            Some((constants, self.resource(1)?))
        } else {
            None
        };

        let dst = self.surfaces.get_mut(&target.id())
            .ok_or_else(|| Error::InvalidResource("unknown target".to_string()))?;
        for y in 0..height {
            for x in 0..width {
                let i = (y * width + x) as usize;
                if let Some((test, plane)) = &stencil_plane {
                    let value = plane.stencil[i] & test.read_mask;
                    if !test.compare.evaluate(value, test.reference & test.read_mask) {
                        continue;
                    }
                }
                if let Some((constants, depth)) = &merge {
                    let sx = x * constants.texel_scale;
                    let sy = y * constants.texel_scale;
                    if u32::from(depth.stencil[depth.index(sx, sy)]) == constants.sentinel {
                        continue;
                    }
                }
                let sx = x * source.width / width;
                let sy = y * source.height / height;
                let mut texel = source.color[source.index(sx, sy)];
                if let ShaderProgram::External(tag) = program {
                    texel[3] = tag as f32;
                }
                dst.color[i] = texel;
            }
        }
        Ok(())
    }
}

impl GraphicsDevice for MockDevice {
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        if self.fail_create {
            return Err(Error::OutOfMemory);
        }
        self.created += 1;
        self.commands.push(format!("create_texture {}", desc.name));
        Ok(self.make_texture(&desc.name, desc.width, desc.height, desc.format))
    }

    fn copy_texture(&mut self, dst: &Arc<dyn Texture>, src: &Arc<dyn Texture>) -> Result<()> {
        if !dst.info().copy_compatible(src.info()) {
            return Err(Error::SizeMismatch {
                resource: "copy".to_string(),
                expected: dst.info().extent(),
                actual: src.info().extent(),
            });
        }
        self.commands.push("copy_texture".to_string());
        let data = self.surfaces[&src.id()].clone();
        self.surfaces.insert(dst.id(), data);
        Ok(())
    }

    fn clear_render_target(&mut self, target: &Arc<dyn Texture>, color: [f32; 4]) -> Result<()> {
        self.commands.push("clear_render_target".to_string());
        self.fill(target, color);
        Ok(())
    }

    fn clear_depth_stencil(&mut self, target: &Arc<dyn Texture>, depth: f32, stencil: u8) -> Result<()> {
        self.commands.push("clear_depth_stencil".to_string());
        let surface = self.surface_mut(target);
        surface.depth.iter_mut().for_each(|d| *d = depth);
        surface.stencil.iter_mut().for_each(|s| *s = stencil);
        Ok(())
    }

    fn pipeline_state(&self) -> PipelineState {
        self.state.clone()
    }

    fn set_pipeline_state(&mut self, state: &PipelineState) {
        self.state = state.clone();
    }

    fn push_constants(&mut self, data: &[u8]) -> Result<()> {
        self.constants = data.to_vec();
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, _first_vertex: u32) -> Result<()> {
        self.commands.push("draw".to_string());
        if vertex_count == 3 {
            self.fullscreen()?;
        }
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        self.commands.push("draw_indexed".to_string());
        self.indexed_draws.push(IndexedDraw {
            index_count,
            first_index,
            vertex_offset,
            program: self.state.program,
            target: self.state.render_targets.first().map(|t| t.id()),
            resources: self.state.shader_resources.iter().map(|t| t.id()).collect(),
            viewport_width: self.state.viewport.width,
        });
        Ok(())
    }
}

// ============================================================================
// Mock Host
// ============================================================================

/// Shared targets the mock host exposes, with their half-resolution flag
pub const MOCK_TARGETS: [(RenderTargetId, bool); 10] = [
    (RenderTargetId::Normals, false),
    (RenderTargetId::Albedo, false),
    (RenderTargetId::Emissive, false),
    (RenderTargetId::Material, false),
    (RenderTargetId::AmbientOcclusion, false),
    (RenderTargetId::MotionVectors, false),
    (RenderTargetId::DepthMip, true),
    (RenderTargetId::Mask, false),
    (RenderTargetId::DeferredDiffuse, true),
    (RenderTargetId::DeferredSpecular, true),
];

/// Distinct first-pass color for a shared target
pub fn primary_color(index: usize) -> [f32; 4] {
    [0.1 * (index as f32 + 1.0), 0.05, 0.0, 1.0]
}

pub struct MockHost {
    pub device: MockDevice,
    pub device_available: bool,
    pub back_buffer: Arc<dyn Texture>,
    pub main_color: Arc<dyn Texture>,
    pub main_depth: Arc<dyn Texture>,
    pub targets: FxHashMap<RenderTargetId, Arc<dyn Texture>>,
    pub primary_camera: Option<CameraState>,
    pub current_camera: CameraState,
    pub current_camera_available: bool,
    pub view_projection: ViewProjection,
    pub lighting: LightRoot,
    pub lighting_available: bool,
    pub eye: Vec3,
    pub geometry: Option<ScopeGeometry>,
    pub upscaler: Option<OutputSlot>,
    pub first_person: Option<CameraId>,
    pub fail_draw_world: bool,
    /// Full-resolution pixel rect the world draw stamps with the sentinel
    pub scope_rect: (u32, u32, u32, u32),
    pub world_draws: u32,
    pub camera_during_draw: Option<CameraState>,
    pub view_projection_during_draw: Option<ViewProjection>,
    pub lights_during_draw: Vec<LightState>,
    pub ambient_during_draw: Option<AmbientState>,
}

impl MockHost {
    pub fn new(width: u32, height: u32) -> Self {
        let mut device = MockDevice::new();
        let back_buffer = device.make_texture("back_buffer", width, height, TextureFormat::R8G8B8A8_UNORM);
        let main_color = device.make_texture("main_color", width, height, TextureFormat::R16G16B16A16_FLOAT);
        let main_depth = device.make_texture("main_depth", width, height, TextureFormat::D24_UNORM_S8_UINT);
        device.fill(&back_buffer, [0.9, 0.9, 0.9, 1.0]);
        device.fill(&main_color, [0.8, 0.7, 0.6, 1.0]);

        let mut targets = FxHashMap::default();
        for (index, (id, half)) in MOCK_TARGETS.iter().enumerate() {
            let (w, h) = if *half { (width / 2, height / 2) } else { (width, height) };
            let texture = device.make_texture(&id.to_string(), w, h, TextureFormat::R16G16B16A16_FLOAT);
            device.fill(&texture, primary_color(index));
            targets.insert(*id, texture);
        }

        let volume = ViewVolume::from_fov(75.0, width as f32 / height as f32, 5.0, 10_000.0);
        let mut primary = CameraState::new(Vec3::new(100.0, 200.0, 50.0), volume).with_yaw_pitch(30.0, 10.0);
        primary.id = Some(CameraId(1));

        let mut lighting = LightRoot::new();
        for (list, kind) in [(0, LightKind::Point), (0, LightKind::Spot), (1, LightKind::Directional)] {
            lighting.insert_light(list, Light {
                kind,
                state: LightState {
                    cull_flag: CullFlag::PartiallyVisible,
                    occluded: true,
                    temporary: true,
                    dynamic: false,
                    lod_dimmer: 0.4,
                    camera: Some(CameraId(1)),
                    culling_process: Some(CullingProcessId(7)),
                },
            });
        }
        lighting.set_visibility_counters(VisibilityCounters {
            visible_lights: 3,
            visible_shadow_lights: 1,
            active_shadow_maps: 2,
        });
        lighting.set_ambient_state(&mock_ambient());

        Self {
            device,
            device_available: true,
            back_buffer,
            main_color,
            main_depth,
            targets,
            primary_camera: Some(primary),
            current_camera: primary,
            current_camera_available: true,
            view_projection: ViewProjection {
                view: primary.view_matrix(),
                projection: primary.projection_matrix(),
                view_projection: primary.view_projection_matrix(),
                eye_position: primary.position,
            },
            lighting,
            lighting_available: true,
            eye: primary.position,
            geometry: Some(ScopeGeometry { index_count: 6, first_index: 0, vertex_offset: 0 }),
            upscaler: None,
            first_person: Some(CameraId(2)),
            fail_draw_world: false,
            scope_rect: (width / 4, height / 4, width / 2, height / 2),
            world_draws: 0,
            camera_during_draw: None,
            view_projection_during_draw: None,
            lights_during_draw: Vec::new(),
            ambient_during_draw: None,
        }
    }

    pub fn target(&self, id: RenderTargetId) -> Arc<dyn Texture> {
        self.targets[&id].clone()
    }

    /// Replace a shared target with a new texture of a different size
    pub fn resize_target(&mut self, id: RenderTargetId, width: u32, height: u32) -> Arc<dyn Texture> {
        let texture = self.device.make_texture(&id.to_string(), width, height, TextureFormat::R16G16B16A16_FLOAT);
        self.targets.insert(id, texture.clone());
        texture
    }

    pub fn light_keys(&self) -> Vec<LightKey> {
        self.lighting.light_lists().iter().flatten().copied().collect()
    }

    pub fn light_states(&self) -> Vec<Option<LightState>> {
        self.light_keys().into_iter()
            .map(|key| self.lighting.light(key).ok().map(|l| l.state))
            .collect()
    }
}

/// Non-trivial ambient state for round-trip checks
pub fn mock_ambient() -> AmbientState {
    let mut ambient = AmbientState::default();
    for axis in 0..3 {
        for sign in 0..2 {
            ambient.color_table[axis][sign] = Vec4::new(0.1 * axis as f32, 0.2 * sign as f32, 0.3, 1.0);
        }
    }
    ambient.enable_flags = [true, false];
    ambient.transforms[1] = glam::Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    ambient.specular_enabled = true;
    ambient
}

impl HostRenderer for MockHost {
    fn device(&mut self) -> Option<&mut dyn GraphicsDevice> {
        if self.device_available {
            Some(&mut self.device)
        } else {
            None
        }
    }

    fn frame_targets(&self) -> Option<FrameTargets> {
        Some(FrameTargets {
            back_buffer: self.back_buffer.clone(),
            main_color: self.main_color.clone(),
            main_depth_stencil: self.main_depth.clone(),
        })
    }

    fn render_target(&self, id: RenderTargetId) -> Option<Arc<dyn Texture>> {
        self.targets.get(&id).cloned()
    }

    fn clone_primary_camera(&self) -> Option<CameraState> {
        self.primary_camera
    }

    fn first_person_camera(&self) -> Option<CameraId> {
        self.first_person
    }

    fn current_camera(&self) -> Option<CameraState> {
        self.current_camera_available.then_some(self.current_camera)
    }

    fn set_current_camera(&mut self, camera: CameraState) {
        self.current_camera = camera;
    }

    fn view_projection(&self) -> ViewProjection {
        self.view_projection
    }

    fn set_view_projection(&mut self, cache: ViewProjection) {
        self.view_projection = cache;
    }

    fn scene_lighting(&mut self) -> Option<&mut dyn SceneLighting> {
        if self.lighting_available {
            Some(&mut self.lighting)
        } else {
            None
        }
    }

    fn accumulator_eye_position(&self) -> Vec3 {
        self.eye
    }

    fn set_accumulator_eye_position(&mut self, eye: Vec3) {
        self.eye = eye;
    }

    fn draw_world(&mut self) -> Result<()> {
        self.world_draws += 1;
        self.camera_during_draw = Some(self.current_camera);
        self.view_projection_during_draw = Some(self.view_projection);
        self.lights_during_draw = self.light_keys().into_iter()
            .filter_map(|key| self.lighting.light(key).ok().map(|l| l.state))
            .collect();
        self.ambient_during_draw = Some(self.lighting.ambient_state());

        // The host's own culling scribbles over the light state
        for key in self.light_keys() {
            let _ = self.lighting.set_light_state(key, &LightState {
                cull_flag: CullFlag::Culled,
                occluded: true,
                temporary: false,
                dynamic: false,
                lod_dimmer: 0.0,
                camera: Some(CameraId(99)),
                culling_process: Some(CullingProcessId(99)),
            });
        }
        self.lighting.set_visibility_counters(VisibilityCounters::default());
        self.lighting.set_ambient_state(&AmbientState::default());

        if self.fail_draw_world {
            return Err(Error::BackendError("world draw failed".to_string()));
        }

        let main_color = self.main_color.clone();
        self.device.fill(&main_color, SECONDARY_COLOR);
        // The host presents through the back buffer as part of its draw
        let back_buffer = self.back_buffer.clone();
        self.device.fill(&back_buffer, SECONDARY_COLOR);
        let targets: Vec<_> = self.targets.values().cloned().collect();
        for target in targets {
            self.device.fill(&target, SECONDARY_COLOR);
        }
        let depth = self.main_depth.clone();
        self.device.write_stencil_rect(&depth, self.scope_rect, MOCK_SENTINEL);
        Ok(())
    }

    fn scope_geometry(&mut self) -> Option<ScopeGeometry> {
        self.geometry
    }

    fn upscaler_output(&self) -> Option<OutputSlot> {
        self.upscaler.clone()
    }
}
