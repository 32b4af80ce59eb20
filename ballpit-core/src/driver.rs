//! Animation lifecycle: decides when frames run and measures their timing.
//!
//! The driver is a small state machine fed with host signals (viewport
//! intersection, document visibility, resize, animation frames). It runs
//! only while the surface intersects the viewport and the document is
//! visible. Time is supplied by the host as seconds on a monotonic clock.

use crate::camera::{Camera, Viewport, WorldSize};
use log::{debug, warn};

/// Resize bursts are coalesced into one recomputation this long after the last event
pub const RESIZE_DEBOUNCE: f64 = 0.1;

/// Per-frame timing handed to the stepper
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the previous frame
    pub delta: f32,
    /// Seconds spent running, excluding stopped periods
    pub elapsed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Stopped,
    Running,
    Disposed,
}

/// Token for one scheduled animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingResize {
    viewport: Viewport,
    due: f64,
}

#[derive(Debug)]
pub struct Driver {
    state: LifecycleState,
    intersecting: bool,
    document_hidden: bool,
    camera: Camera,
    viewport: Viewport,
    pending_resize: Option<PendingResize>,
    scheduled: Option<FrameRequest>,
    next_request: u64,
    last_tick: f64,
    elapsed: f64,
}

impl Driver {
    /// Create a stopped driver sized to `viewport`
    pub fn new(camera: Camera, viewport: Viewport) -> Self {
        let mut driver = Self {
            state: LifecycleState::Stopped,
            intersecting: false,
            document_hidden: false,
            camera,
            viewport,
            pending_resize: None,
            scheduled: None,
            next_request: 0,
            last_tick: 0.0,
            elapsed: 0.0,
        };
        driver.camera.set_viewport(viewport);
        driver
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LifecycleState::Running
    }

    pub fn is_disposed(&self) -> bool {
        self.state == LifecycleState::Disposed
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn world_size(&self) -> WorldSize {
        self.camera.world_size()
    }

    /// The frame the host should service next, if any
    pub fn scheduled_frame(&self) -> Option<FrameRequest> {
        self.scheduled
    }

    /// When a pending resize becomes due
    pub fn resize_due(&self) -> Option<f64> {
        self.pending_resize.map(|p| p.due)
    }

    pub fn set_intersecting(&mut self, intersecting: bool, now: f64) {
        if self.ignore_after_dispose("intersection change") {
            return;
        }
        self.intersecting = intersecting;
        self.sync_running(now);
    }

    pub fn set_document_hidden(&mut self, hidden: bool, now: f64) {
        if self.ignore_after_dispose("visibility change") {
            return;
        }
        self.document_hidden = hidden;
        self.sync_running(now);
    }

    /// Record a resize; it is applied by [`Driver::poll`] once the burst settles
    pub fn request_resize(&mut self, viewport: Viewport, now: f64) {
        if self.ignore_after_dispose("resize") {
            return;
        }
        self.pending_resize = Some(PendingResize {
            viewport,
            due: now + RESIZE_DEBOUNCE,
        });
    }

    /// Apply a due resize. Returns the new world size when one was applied.
    pub fn poll(&mut self, now: f64) -> Option<WorldSize> {
        let pending = self.pending_resize?;
        if now < pending.due {
            return None;
        }
        self.pending_resize = None;
        self.resize(pending.viewport)
    }

    /// Resize immediately, bypassing the debounce
    pub fn resize(&mut self, viewport: Viewport) -> Option<WorldSize> {
        if self.ignore_after_dispose("resize") {
            return None;
        }
        self.viewport = viewport;
        self.camera.set_viewport(viewport);
        let world = self.camera.world_size();
        debug!(
            "resized to {}x{} px, world {:.3}x{:.3}",
            viewport.width, viewport.height, world.width, world.height
        );
        Some(world)
    }

    /// Service a scheduled frame. Stale or cancelled requests yield nothing.
    pub fn animate(&mut self, request: FrameRequest, now: f64) -> Option<FrameTime> {
        if self.state != LifecycleState::Running || self.scheduled != Some(request) {
            return None;
        }
        let delta = (now - self.last_tick).max(0.0);
        self.last_tick = now;
        self.elapsed += delta;
        self.schedule();

        Some(FrameTime {
            delta: delta as f32,
            elapsed: self.elapsed as f32,
        })
    }

    /// Stop the loop and ignore every later signal
    pub fn dispose(&mut self) {
        if self.state == LifecycleState::Disposed {
            return;
        }
        self.scheduled = None;
        self.pending_resize = None;
        self.state = LifecycleState::Disposed;
        debug!("driver disposed");
    }

    fn sync_running(&mut self, now: f64) {
        let visible = self.intersecting && !self.document_hidden;
        match (self.state, visible) {
            (LifecycleState::Stopped, true) => self.start(now),
            (LifecycleState::Running, false) => self.stop(),
            _ => {}
        }
    }

    fn start(&mut self, now: f64) {
        self.state = LifecycleState::Running;
        // The clock restarts so the first delta after a resume is not a catch-up
        self.last_tick = now;
        self.schedule();
        debug!("animation started at {:.3}s", now);
    }

    fn stop(&mut self) {
        self.state = LifecycleState::Stopped;
        self.scheduled = None;
        debug!("animation stopped after {:.3}s running", self.elapsed);
    }

    fn schedule(&mut self) {
        self.next_request += 1;
        self.scheduled = Some(FrameRequest(self.next_request));
    }

    fn ignore_after_dispose(&self, signal: &str) -> bool {
        if self.state == LifecycleState::Disposed {
            warn!("ignoring {} after disposal", signal);
            return true;
        }
        false
    }
}
