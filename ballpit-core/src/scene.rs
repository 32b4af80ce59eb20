//! The ballpit scene: one ensemble, its lifecycle driver, the pointer
//! surface steering particle 0, and the render backend it feeds.

use crate::camera::{Camera, Viewport, WorldSize};
use crate::config::{ConfigError, SimulationConfig};
use crate::driver::{Driver, FrameRequest, FrameTime};
use crate::ensemble::Ensemble;
use crate::gradient::Gradient;
use crate::integrator::step;
use crate::pointer::{PointerHandler, PointerState, PointerTracker, SurfaceBounds, SurfaceId, TrackerError};
use glam::{Vec2, Vec3};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BallpitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Placement of one rendered sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceTransform {
    pub position: Vec3,
    /// Uniform scale, equal to the radius
    pub scale: f32,
}

/// Consumer of the per-frame output. Rendering itself happens elsewhere.
pub trait RenderBackend {
    /// Called on construction and reconfiguration when the palette has two or more stops
    fn set_colors(&mut self, _instance_colors: &[Vec3], _light_color: Vec3) {}
    fn resize(&mut self, _viewport: Viewport) {}
    fn draw(&mut self, instances: &[InstanceTransform], light_position: Vec3);
}

/// Where the pointer wants particle 0, as last written by the surface callbacks
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerTarget {
    pub ndc: Vec2,
    pub engaged: bool,
    /// A move or leave arrived since the last frame consumed the target
    pub pending: bool,
}

/// Moves engage control at the pointer, leaving releases it
struct CursorHandler {
    target: Rc<Cell<PointerTarget>>,
}

impl PointerHandler for CursorHandler {
    fn on_move(&mut self, pointer: &PointerState) {
        self.target.set(PointerTarget {
            ndc: pointer.ndc,
            engaged: true,
            pending: true,
        });
    }

    fn on_leave(&mut self, _pointer: &PointerState) {
        let mut target = self.target.get();
        target.engaged = false;
        target.pending = true;
        self.target.set(target);
    }
}

pub struct Ballpit<B: RenderBackend> {
    driver: Driver,
    config: SimulationConfig,
    ensemble: Ensemble,
    target: Rc<Cell<PointerTarget>>,
    surface: SurfaceId,
    backend: B,
    rng: StdRng,
    instances: Vec<InstanceTransform>,
    paused: bool,
}

impl<B: RenderBackend> Ballpit<B> {
    /// Build the scene and register its surface with `tracker`
    pub fn new(
        config: SimulationConfig,
        backend: B,
        tracker: &mut PointerTracker,
        surface: SurfaceId,
        bounds: Box<dyn SurfaceBounds>,
        viewport: Viewport,
        seed: u64,
    ) -> Result<Self, BallpitError> {
        config.validate()?;

        let target = Rc::new(Cell::new(PointerTarget::default()));
        tracker.register_surface(
            surface,
            bounds,
            Box::new(CursorHandler {
                target: Rc::clone(&target),
            }),
        )?;

        let driver = Driver::new(Camera::default(), viewport);
        let config = fit_to_world(&config, driver.world_size());
        let mut rng = StdRng::seed_from_u64(seed);
        let ensemble = Ensemble::new(&config, &mut rng);

        let mut ballpit = Self {
            driver,
            config,
            ensemble,
            target,
            surface,
            backend,
            rng,
            instances: Vec::new(),
            paused: false,
        };
        ballpit.backend.resize(viewport);
        ballpit.apply_colors();
        ballpit.update_instances();
        Ok(ballpit)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn instances(&self) -> &[InstanceTransform] {
        &self.instances
    }

    pub fn pointer_target(&self) -> PointerTarget {
        self.target.get()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn set_intersecting(&mut self, intersecting: bool, now: f64) {
        self.driver.set_intersecting(intersecting, now);
    }

    pub fn set_document_hidden(&mut self, hidden: bool, now: f64) {
        self.driver.set_document_hidden(hidden, now);
    }

    pub fn request_resize(&mut self, viewport: Viewport, now: f64) {
        self.driver.request_resize(viewport, now);
    }

    /// Apply a due resize. Returns true when the world bounds changed.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.driver.poll(now) {
            Some(world) => {
                self.apply_world(world);
                true
            }
            None => false,
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if let Some(world) = self.driver.resize(viewport) {
            self.apply_world(world);
        }
    }

    pub fn scheduled_frame(&self) -> Option<FrameRequest> {
        self.driver.scheduled_frame()
    }

    /// Service one animation frame: steer, step, then hand instances to the backend
    pub fn animate(&mut self, request: FrameRequest, now: f64) -> Option<FrameTime> {
        let time = self.driver.animate(request, now)?;
        if !self.paused {
            self.sync_target();
            step(&mut self.ensemble, &self.config, time);
        }
        self.update_instances();
        let light = self.light_position();
        self.backend.draw(&self.instances, light);
        Some(time)
    }

    /// Replace the configuration and rebuild the ensemble from scratch
    pub fn reconfigure(&mut self, config: SimulationConfig) -> Result<(), ConfigError> {
        if self.driver.is_disposed() {
            warn!("ignoring reconfiguration after disposal");
            return Ok(());
        }
        config.validate()?;
        let config = fit_to_world(&config, self.driver.world_size());
        // The new config's controlSphere0 holds until the next pointer callback
        self.discard_pending();
        self.ensemble = Ensemble::new(&config, &mut self.rng);
        self.config = config;
        debug!("rebuilt ensemble with {} particles", self.config.count);

        self.apply_colors();
        self.update_instances();
        Ok(())
    }

    pub fn set_count(&mut self, count: usize) -> Result<(), ConfigError> {
        self.reconfigure(self.config.with_count(count))
    }

    /// Stop the loop and release the pointer surface. Safe to call twice.
    pub fn dispose(&mut self, tracker: &mut PointerTracker) -> Result<(), TrackerError> {
        if self.driver.is_disposed() {
            return Ok(());
        }
        self.driver.dispose();
        tracker.unregister_surface(self.surface)
    }

    /// Apply the pointer callbacks received since the last frame. A move
    /// projects the pointer into the world and engages particle 0, a leave
    /// releases it. Without callbacks the configured flag stays as it is.
    fn sync_target(&mut self) {
        let target = self.target.get();
        if !target.pending {
            return;
        }
        self.discard_pending();
        if target.engaged {
            let center = self.driver.camera().ndc_to_world(target.ndc);
            self.ensemble.set_center(center);
        }
        if target.engaged != self.config.control_sphere0 {
            self.config = self.config.with_control_sphere0(target.engaged);
        }
    }

    fn discard_pending(&mut self) {
        let mut target = self.target.get();
        target.pending = false;
        self.target.set(target);
    }

    fn apply_world(&mut self, world: WorldSize) {
        self.config = fit_to_world(&self.config, world);
        self.backend.resize(self.driver.viewport());
    }

    fn apply_colors(&mut self) {
        let gradient = Gradient::from_hex(&self.config.colors);
        if let Some(colors) = gradient.instance_colors(self.ensemble.count()) {
            let light = colors.first().copied().unwrap_or(Vec3::ZERO);
            self.backend.set_colors(&colors, light);
        }
    }

    fn update_instances(&mut self) {
        let hide_first = !self.config.follow_cursor;
        self.instances.clear();
        self.instances.extend(
            self.ensemble
                .positions()
                .iter()
                .zip(self.ensemble.radii())
                .enumerate()
                .map(|(i, (&position, &radius))| InstanceTransform {
                    position,
                    scale: if i == 0 && hide_first { 0.0 } else { radius },
                }),
        );
    }

    fn light_position(&self) -> Vec3 {
        self.ensemble.positions().first().copied().unwrap_or(Vec3::ZERO)
    }
}

/// Half the visible world becomes the X/Y half-extents
fn fit_to_world(config: &SimulationConfig, world: WorldSize) -> SimulationConfig {
    config.with_bounds(world.width / 2.0, world.height / 2.0)
}
