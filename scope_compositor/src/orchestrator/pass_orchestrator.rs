/// PassOrchestrator — drives the scope pass through the host's single-camera pipeline.
///
/// The host calls `execute_frame()` once per frame from its render thread,
/// at the point of its draw sequence where the primary pass has completed.
/// The orchestrator then walks the linear state machine:
///
/// ```text
/// Idle → TexturesBackedUp → CameraUpdated → TargetsCleared → LightingSynced
///      → SecondaryDrawExecuted → PostProcessed → Restored → Idle
/// ```
///
/// A failed transition aborts the frame. Whatever the pass changed on the
/// host up to that point (light states, eye position, cleared targets) is
/// rolled back before returning to `Idle`. Inside `Restored`, each sub-step
/// runs regardless of the ones before it.

use std::sync::Arc;
use glam::Vec3;
use crate::camera::CameraState;
use crate::config::CompositorConfig;
use crate::culling::AuxiliaryFrustumCuller;
use crate::error::{Error, Result};
use crate::host::{
    BlendState, DepthStencilState, FrameTargets, GraphicsDevice, HostRenderer, PipelineState,
    PrimitiveTopology, RasterizerState, ScopeCompositeConstants, ShaderProgram, Texture,
    ViewProjection, Viewport,
};
use crate::lighting::SceneStateGuard;
use crate::merge::RegionMerger;
use crate::state::GlobalRenderState;
use super::frame_textures::{FrameTexture, TemporaryFrameTextures};
use super::pass_state::PassState;
use super::post_process::PostProcessPass;
use super::scope_camera::ScopeCamera;

const SOURCE: &str = "scope::PassOrchestrator";

/// How a frame ended
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Pipeline disabled or not initialized, nothing touched
    Skipped,
    /// `stage` could not be reached; host state was rolled back
    Aborted { stage: PassState, error: Error },
    /// Every stage ran
    Composited,
}

/// Summary of one `execute_frame()` call
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub outcome: FrameOutcome,
    pub lights_applied: usize,
    pub lights_skipped: usize,
    pub targets_merged: usize,
    pub targets_skipped: usize,
    /// Scratch copies skipped because the live resource did not match
    pub copies_skipped: usize,
    /// The scope texture was drawn onto the scope geometry
    pub scope_drawn: bool,
}

impl FrameReport {
    fn new(frame_index: u64) -> Self {
        Self {
            frame_index,
            outcome: FrameOutcome::Skipped,
            lights_applied: 0,
            lights_skipped: 0,
            targets_merged: 0,
            targets_skipped: 0,
            copies_skipped: 0,
            scope_drawn: false,
        }
    }

    pub fn is_composited(&self) -> bool {
        matches!(self.outcome, FrameOutcome::Composited)
    }
}

/// Per-frame references and progress flags, dropped at `Idle`
struct FrameContext {
    targets: Option<FrameTargets>,
    live: Vec<Option<Arc<dyn Texture>>>,
    scope_camera: Option<CameraState>,
    eye_backup: Option<Vec3>,
    scope_captured: bool,
    textures_backed_up: bool,
    camera_updated: bool,
    targets_cleared: bool,
    lighting_synced: bool,
    render_executed: bool,
    report: FrameReport,
}

impl FrameContext {
    fn new(frame_index: u64) -> Self {
        Self {
            targets: None,
            live: Vec::new(),
            scope_camera: None,
            eye_backup: None,
            scope_captured: false,
            textures_backed_up: false,
            camera_updated: false,
            targets_cleared: false,
            lighting_synced: false,
            render_executed: false,
            report: FrameReport::new(frame_index),
        }
    }

    fn targets(&self) -> Result<&FrameTargets> {
        self.targets.as_ref()
            .ok_or_else(|| Error::PreconditionNotMet("frame targets not acquired".to_string()))
    }
}

fn device_of(host: &mut dyn HostRenderer) -> Result<&mut dyn GraphicsDevice> {
    host.device()
        .ok_or_else(|| Error::PreconditionNotMet("graphics device unavailable".to_string()))
}

/// Orchestrator of the dual-pass compositor
pub struct PassOrchestrator {
    config: CompositorConfig,
    render_state: GlobalRenderState,
    guard: SceneStateGuard,
    culler: AuxiliaryFrustumCuller,
    merger: RegionMerger,
    frame_textures: TemporaryFrameTextures,
    scope_camera: ScopeCamera,
    post_passes: Vec<Box<dyn PostProcessPass>>,
    state: PassState,
    frame_index: u64,
    initialized: bool,
}

impl PassOrchestrator {
    /// Create an orchestrator for `config`
    ///
    /// # Errors
    ///
    /// `InitializationFailed` if the configuration does not validate.
    pub fn new(config: CompositorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            render_state: GlobalRenderState::new(),
            guard: SceneStateGuard::new(),
            culler: AuxiliaryFrustumCuller::new(&config),
            merger: RegionMerger::new(&config),
            frame_textures: TemporaryFrameTextures::new(),
            scope_camera: ScopeCamera::new(config.camera_offset),
            post_passes: Vec::new(),
            state: PassState::Idle,
            frame_index: 0,
            initialized: false,
            config,
        })
    }

    /// Set up default state and the shared-target backups.
    ///
    /// Marks the scope ready. The pipeline still waits for
    /// `set_render_ready(true)` before running.
    ///
    /// # Errors
    ///
    /// `PreconditionNotMet` if the host has no device yet.
    pub fn initialize(&mut self, host: &mut dyn HostRenderer) -> Result<()> {
        self.render_state.initialize(&*host);
        let live = self.merger.live_targets(&*host);
        let device = device_of(host)?;
        self.merger.initialize(device, &live);
        self.render_state.set_scope_ready(true);
        self.initialized = true;
        crate::scope_info!(SOURCE, "Scope compositor initialized ({} merge targets)", self.merger.enabled_count());
        Ok(())
    }

    /// Release every owned texture and return to the zeroed state
    pub fn shutdown(&mut self) {
        self.frame_textures.release();
        self.merger.release();
        self.guard.clear();
        self.culler.invalidate_cached_frustum_planes();
        self.scope_camera.release();
        self.render_state.reset();
        self.state = PassState::Idle;
        self.initialized = false;
        crate::scope_info!(SOURCE, "Scope compositor shut down");
    }

    /// Register a post-process collaborator. Passes run in registration order.
    pub fn add_post_process_pass(&mut self, pass: Box<dyn PostProcessPass>) {
        self.post_passes.push(pass);
    }

    pub fn set_render_ready(&mut self, ready: bool) {
        self.render_state.set_render_ready(ready);
    }

    pub fn set_scope_ready(&mut self, ready: bool) {
        self.render_state.set_scope_ready(ready);
    }

    pub fn is_render_ready(&self) -> bool {
        self.render_state.is_render_ready()
    }

    pub fn is_scope_ready(&self) -> bool {
        self.render_state.is_scope_ready()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    /// Index of the last frame `execute_frame()` ran for
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn render_state(&self) -> &GlobalRenderState {
        &self.render_state
    }

    pub fn render_state_mut(&mut self) -> &mut GlobalRenderState {
        &mut self.render_state
    }

    /// Culler for draw-call filters, valid while the scope draw runs
    pub fn culler(&self) -> &AuxiliaryFrustumCuller {
        &self.culler
    }

    /// Recapture the host's ambient lighting on the next frame, e.g. after
    /// the host reloaded its environment
    pub fn invalidate_ambient_snapshot(&mut self) {
        self.guard.invalidate_ambient_snapshot();
        crate::scope_debug!(SOURCE, "Ambient snapshot invalidated");
    }

    pub fn scene_state_guard(&self) -> &SceneStateGuard {
        &self.guard
    }

    pub fn region_merger(&self) -> &RegionMerger {
        &self.merger
    }

    pub fn scope_camera(&self) -> &ScopeCamera {
        &self.scope_camera
    }

    pub fn scope_camera_mut(&mut self) -> &mut ScopeCamera {
        &mut self.scope_camera
    }

    /// Texture holding the last scope pass output
    pub fn scope_texture(&self) -> Option<&Arc<dyn Texture>> {
        self.frame_textures.scope_texture()
    }

    /// Run the scope pass for one frame.
    ///
    /// Never fails: precondition and draw failures end the frame as
    /// `FrameOutcome::Aborted` with the host left as it was found.
    pub fn execute_frame(&mut self, host: &mut dyn HostRenderer) -> FrameReport {
        self.frame_index += 1;
        let mut frame = FrameContext::new(self.frame_index);

        if !self.initialized || !self.render_state.is_render_ready() || !self.render_state.is_scope_ready() {
            crate::scope_trace!(SOURCE, "Frame {} skipped, pipeline not ready", self.frame_index);
            return frame.report;
        }

        frame.report.outcome = match self.run_pass(host, &mut frame) {
            Ok(()) => FrameOutcome::Composited,
            Err((stage, error)) => {
                if error.is_recoverable() {
                    crate::scope_debug!(SOURCE, "Frame {} aborted before {}: {}", self.frame_index, stage, error);
                } else {
                    crate::scope_error!(SOURCE, "Frame {} aborted before {}: {}", self.frame_index, stage, error);
                }
                self.rollback(host, &mut frame);
                FrameOutcome::Aborted { stage, error }
            }
        };

        self.cleanup(&mut frame);
        frame.report
    }

    fn run_pass(&mut self, host: &mut dyn HostRenderer, frame: &mut FrameContext) -> std::result::Result<(), (PassState, Error)> {
        self.backup_first_pass_textures(host, frame).map_err(|e| (self.state.next(), e))?;
        self.advance();

        self.update_scope_camera(host, frame).map_err(|e| (self.state.next(), e))?;
        self.advance();

        self.clear_targets(host, frame).map_err(|e| (self.state.next(), e))?;
        self.advance();

        self.sync_lighting(host, frame).map_err(|e| (self.state.next(), e))?;
        self.advance();

        self.draw_scope_content(host, frame).map_err(|e| (self.state.next(), e))?;
        self.advance();

        self.post_process(host, frame).map_err(|e| (self.state.next(), e))?;
        self.advance();

        self.restore_first_pass(host, frame);
        self.advance();
        Ok(())
    }

    /// Move to the next state of the pass
    fn advance(&mut self) {
        let next = self.state.next();
        crate::scope_trace!(SOURCE, "{} -> {}", self.state, next);
        self.state = next;
    }

    // ===== STAGES =====

    fn backup_first_pass_textures(&mut self, host: &mut dyn HostRenderer, frame: &mut FrameContext) -> Result<()> {
        let targets = host.frame_targets()
            .ok_or_else(|| Error::PreconditionNotMet("frame targets unavailable".to_string()))?;
        frame.live = self.merger.live_targets(&*host);
        let device = device_of(host)?;

        self.frame_textures.prepare(device, &targets, self.config.quality.resolution_scale())?;
        frame.report.copies_skipped += self.frame_textures.backup(device, &targets);

        let backups = self.merger.backup_render_targets(device, &frame.live);
        frame.report.targets_skipped += backups.skipped;

        frame.targets = Some(targets);
        frame.textures_backed_up = true;
        self.render_state.set_first_copy_done(true);
        Ok(())
    }

    fn update_scope_camera(&mut self, host: &mut dyn HostRenderer, frame: &mut FrameContext) -> Result<()> {
        let primary = host.clone_primary_camera()
            .ok_or_else(|| Error::PreconditionNotMet("primary camera clone failed".to_string()))?;
        self.render_state.set_primary_view_volume(primary.view_volume);
        self.render_state.set_frustum_backed_up(true);

        let camera = self.scope_camera.update(&primary, self.config.target_fov_degrees);
        self.render_state.set_scope_view_volume(camera.view_volume);
        self.culler.update_cached_frustum_planes(&camera, self.frame_index);

        frame.scope_camera = Some(camera);
        frame.camera_updated = true;
        Ok(())
    }

    fn clear_targets(&mut self, host: &mut dyn HostRenderer, frame: &mut FrameContext) -> Result<()> {
        let targets = frame.targets()?.clone();
        let device = device_of(host)?;

        frame.targets_cleared = true;
        device.clear_render_target(&targets.main_color, [0.0; 4])?;
        device.clear_depth_stencil(&targets.main_depth_stencil, 1.0, 0)?;
        for (backup, live) in self.merger.backups().iter().zip(&frame.live) {
            if let Some(texture) = live {
                device.clear_render_target(texture, backup.desc().clear_color)?;
            }
        }
        Ok(())
    }

    fn sync_lighting(&mut self, host: &mut dyn HostRenderer, frame: &mut FrameContext) -> Result<()> {
        let camera = frame.scope_camera
            .ok_or_else(|| Error::PreconditionNotMet("scope camera not updated".to_string()))?;
        let lighting = host.scene_lighting()
            .ok_or_else(|| Error::PreconditionNotMet("light root unavailable".to_string()))?;

        let backup = self.guard.backup_light_states(&*lighting);
        frame.lighting_synced = true;
        let applied = self.guard.apply_light_states_for_scope(
            lighting,
            self.config.limit_light_count,
            self.config.max_lights,
        );
        frame.report.lights_applied = applied.updated;
        frame.report.lights_skipped = backup.skipped + applied.skipped;

        frame.eye_backup = Some(host.accumulator_eye_position());
        host.set_accumulator_eye_position(camera.position);
        Ok(())
    }

    fn draw_scope_content(&mut self, host: &mut dyn HostRenderer, frame: &mut FrameContext) -> Result<()> {
        let camera = frame.scope_camera
            .ok_or_else(|| Error::PreconditionNotMet("scope camera not updated".to_string()))?;
        // Without a camera to put back, the host would keep the scope camera
        let saved_camera = host.current_camera()
            .ok_or_else(|| Error::PreconditionNotMet("host has no current camera to restore".to_string()))?;
        let saved_view_projection = host.view_projection();

        host.set_current_camera(camera);
        host.set_view_projection(ViewProjection {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            view_projection: camera.view_projection_matrix(),
            eye_position: camera.position,
        });

        let result = host.draw_world();

        host.set_current_camera(saved_camera);
        host.set_view_projection(saved_view_projection);

        result?;
        frame.render_executed = true;
        Ok(())
    }

    fn post_process(&mut self, host: &mut dyn HostRenderer, frame: &mut FrameContext) -> Result<()> {
        let targets = frame.targets()?.clone();
        let device = device_of(host)?;

        let mut source = targets.main_color.clone();
        if self.config.quality.runs_post_process() {
            for pass in self.post_passes.iter_mut() {
                match pass.apply(device, &source) {
                    Ok(Some(output)) => source = output,
                    Ok(None) => {}
                    Err(e) => crate::scope_warn!(SOURCE, "Post-process pass '{}' skipped: {}", pass.name(), e),
                }
            }
        }

        match self.frame_textures.scope_texture() {
            Some(scope) => match capture_scope_texture(device, &source, scope) {
                Ok(()) => frame.scope_captured = true,
                Err(e) => crate::scope_warn!(SOURCE, "Scope texture capture failed: {}", e),
            },
            None => crate::scope_warn!(SOURCE, "No scope texture to capture into"),
        }
        Ok(())
    }

    /// Every sub-step runs; failures are logged and the next one starts
    fn restore_first_pass(&mut self, host: &mut dyn HostRenderer, frame: &mut FrameContext) {
        self.restore_lighting(host, frame);

        let Ok(targets) = frame.targets().cloned() else {
            crate::scope_error!(SOURCE, "Frame targets lost before restore");
            return;
        };
        let geometry = host.scope_geometry();
        let output = host.upscaler_output();
        let render_scope_only = self.render_state.is_render_scope_only();
        let Ok(device) = device_of(host) else {
            crate::scope_error!(SOURCE, "Device lost before restore, first-pass content not restored");
            return;
        };

        let merged = self.merger.merge_render_targets(
            device,
            &frame.live,
            &targets.main_depth_stencil,
            self.config.stencil_sentinel,
        );
        frame.report.targets_merged = merged.processed;
        frame.report.targets_skipped += merged.skipped;

        for which in FrameTexture::ALL {
            match self.frame_textures.copy_back(device, which, &targets) {
                Ok(true) => {}
                Ok(false) => crate::scope_debug!(SOURCE, "No {:?} copy to restore this frame", which),
                Err(e) => crate::scope_error!(SOURCE, "Restoring {:?} failed: {}", which, e),
            }
        }
        self.frame_textures.invalidate();

        let (target, viewport) = match output {
            Some(slot) => (slot.target, slot.viewport),
            None => {
                let (width, height) = targets.back_buffer.info().extent();
                (targets.back_buffer.clone(), Viewport::full(width, height))
            }
        };
        self.render_state.set_primary_viewport(viewport);

        if !frame.scope_captured {
            crate::scope_warn!(SOURCE, "Scope texture not captured, composite skipped");
            return;
        }
        let Some(scope) = self.frame_textures.scope_texture() else {
            return;
        };

        let result = if render_scope_only {
            draw_fullscreen(device, &target, viewport, scope)
        } else {
            match geometry {
                Some(geometry) => composite_scope(device, &target, viewport, scope, geometry),
                None => Err(Error::PreconditionNotMet("scope geometry unavailable".to_string())),
            }
        };
        match result {
            Ok(()) => frame.report.scope_drawn = true,
            Err(e) => crate::scope_warn!(SOURCE, "Scope composite skipped: {}", e),
        }
    }

    fn restore_lighting(&mut self, host: &mut dyn HostRenderer, frame: &mut FrameContext) {
        if frame.lighting_synced {
            match host.scene_lighting() {
                Some(lighting) => {
                    let restored = self.guard.restore_light_states(lighting);
                    if restored.skipped > 0 {
                        crate::scope_warn!(SOURCE, "{} lights could not be restored", restored.skipped);
                    }
                }
                None => crate::scope_error!(SOURCE, "Light root lost, light states not restored"),
            }
            frame.lighting_synced = false;
        }
        if let Some(eye) = frame.eye_backup.take() {
            host.set_accumulator_eye_position(eye);
        }
    }

    // ===== ABORT / CLEANUP =====

    /// Undo whatever the aborted frame changed on the host
    fn rollback(&mut self, host: &mut dyn HostRenderer, frame: &mut FrameContext) {
        self.restore_lighting(host, frame);

        if !frame.targets_cleared {
            return;
        }
        let Ok(targets) = frame.targets().cloned() else {
            return;
        };
        let Ok(device) = device_of(host) else {
            crate::scope_error!(SOURCE, "Device lost during rollback, targets left cleared");
            return;
        };

        let restored = self.merger.restore_from_backups(device, &frame.live);
        frame.report.targets_skipped += restored.skipped;
        for which in FrameTexture::ALL {
            if let Err(e) = self.frame_textures.copy_back(device, which, &targets) {
                crate::scope_error!(SOURCE, "Rolling back {:?} failed: {}", which, e);
            }
        }
        self.frame_textures.invalidate();
    }

    fn cleanup(&mut self, frame: &mut FrameContext) {
        crate::scope_trace!(SOURCE,
            "Frame {} cleanup (backed up: {}, camera: {}, cleared: {}, rendered: {})",
            self.frame_index, frame.textures_backed_up, frame.camera_updated,
            frame.targets_cleared, frame.render_executed);

        self.culler.invalidate_cached_frustum_planes();
        self.scope_camera.release();
        self.frame_textures.invalidate();
        self.guard.end_frame();
        self.render_state.set_frustum_backed_up(false);

        frame.targets = None;
        frame.live.clear();
        frame.scope_camera = None;
        frame.textures_backed_up = false;
        frame.camera_updated = false;
        frame.targets_cleared = false;
        frame.lighting_synced = false;
        frame.render_executed = false;

        self.state = PassState::Idle;
    }
}

// ===== DEVICE HELPERS =====

fn fullscreen_state(target: &Arc<dyn Texture>, viewport: Viewport, source: &Arc<dyn Texture>, program: ShaderProgram) -> PipelineState {
    PipelineState {
        render_targets: vec![target.clone()],
        depth_stencil_view: None,
        viewport,
        blend: BlendState::Opaque,
        depth_stencil: DepthStencilState::default(),
        rasterizer: RasterizerState { cull_back_faces: false, scissor_enable: false },
        topology: PrimitiveTopology::TriangleList,
        program: Some(program),
        shader_resources: vec![source.clone()],
    }
}

/// Scaled copy of `source` into the scope texture
fn capture_scope_texture(device: &mut dyn GraphicsDevice, source: &Arc<dyn Texture>, scope: &Arc<dyn Texture>) -> Result<()> {
    let (width, height) = scope.info().extent();
    draw_fullscreen(device, scope, Viewport::full(width, height), source)
}

fn draw_fullscreen(device: &mut dyn GraphicsDevice, target: &Arc<dyn Texture>, viewport: Viewport, source: &Arc<dyn Texture>) -> Result<()> {
    let saved = device.pipeline_state();
    device.set_pipeline_state(&fullscreen_state(target, viewport, source, ShaderProgram::FullscreenCopy));
    let result = device.draw(3, 0);
    device.set_pipeline_state(&saved);
    result
}

/// Paint the scope texture onto the host's scope quad
fn composite_scope(
    device: &mut dyn GraphicsDevice,
    target: &Arc<dyn Texture>,
    viewport: Viewport,
    scope: &Arc<dyn Texture>,
    geometry: crate::host::ScopeGeometry,
) -> Result<()> {
    let (width, height) = scope.info().extent();
    let constants = ScopeCompositeConstants {
        viewport: [viewport.x, viewport.y, viewport.width, viewport.height],
        texel_size: [width as f32, height as f32, 1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
    };

    let saved = device.pipeline_state();
    let mut state = fullscreen_state(target, viewport, scope, ShaderProgram::ScopeComposite);
    state.rasterizer.cull_back_faces = true;
    device.set_pipeline_state(&state);
    let result = device.push_constants(bytemuck::bytes_of(&constants))
        .and_then(|()| device.draw_indexed(geometry.index_count, geometry.first_index, geometry.vertex_offset));
    device.set_pipeline_state(&saved);
    result
}

#[cfg(test)]
#[path = "pass_orchestrator_tests.rs"]
mod tests;
