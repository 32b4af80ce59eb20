//! Pointer and touch tracking across any number of surfaces.
//!
//! The host forwards document-level pointer, click and touch events once,
//! and the tracker fans them out to every registered surface: it tests the
//! raw coordinate against the surface's current bounding rectangle, maps it
//! to normalized coordinates in `[-1, 1]` (Y up) and fires the surface's
//! enter/move/click/leave callbacks.
//!
//! The shared document listeners are reference counted: the first
//! registration installs them through the [`ListenerHost`], the last
//! unregistration removes them.

use glam::Vec2;
use log::debug;
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("surface {0:?} is already tracked")]
    AlreadyRegistered(SurfaceId),
    #[error("surface {0:?} is not tracked")]
    UnknownSurface(SurfaceId),
}

/// Opaque identity of a tracked surface, chosen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Bounding rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Edges are inclusive. A zero-area rectangle contains nothing.
    pub fn contains(&self, point: Vec2) -> bool {
        self.has_area()
            && point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }
}

/// Source of a surface's current bounding rectangle
pub trait SurfaceBounds {
    fn bounding_rect(&self) -> Rect;
}

impl SurfaceBounds for Rect {
    fn bounding_rect(&self) -> Rect {
        *self
    }
}

/// Shared rectangle the host can move or resize after registration
impl SurfaceBounds for Rc<Cell<Rect>> {
    fn bounding_rect(&self) -> Rect {
        self.get()
    }
}

/// Per-surface pointer state handed to every callback
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    /// Surface-local pixels
    pub position: Vec2,
    /// Normalized device coordinates, Y up
    pub ndc: Vec2,
    pub hovering: bool,
    pub touching: bool,
}

/// Callbacks for one surface. All default to no-ops.
pub trait PointerHandler {
    fn on_enter(&mut self, _pointer: &PointerState) {}
    fn on_move(&mut self, _pointer: &PointerState) {}
    fn on_click(&mut self, _pointer: &PointerState) {}
    fn on_leave(&mut self, _pointer: &PointerState) {}
}

/// Installs and removes the shared document-level listeners
pub trait ListenerHost {
    fn install(&mut self);
    fn remove(&mut self);
}

/// Host for environments that deliver events without explicit listeners
#[derive(Debug, Default)]
pub struct NoListeners;

impl ListenerHost for NoListeners {
    fn install(&mut self) {}
    fn remove(&mut self) {}
}

struct TrackedSurface {
    id: SurfaceId,
    bounds: Box<dyn SurfaceBounds>,
    handler: Box<dyn PointerHandler>,
    state: PointerState,
}

impl TrackedSurface {
    fn update_position(&mut self, raw: Vec2, rect: &Rect) {
        let local = Vec2::new(raw.x - rect.left, raw.y - rect.top);
        self.state.position = local;
        // Degenerate rectangles keep the last finite coordinate
        if rect.width > 0.0 {
            self.state.ndc.x = (local.x / rect.width) * 2.0 - 1.0;
        }
        if rect.height > 0.0 {
            self.state.ndc.y = (-local.y / rect.height) * 2.0 + 1.0;
        }
    }

    fn enter(&mut self) {
        self.state.hovering = true;
        self.handler.on_enter(&self.state);
    }

    fn leave(&mut self) {
        self.state.hovering = false;
        self.handler.on_leave(&self.state);
    }

    fn moved(&mut self) {
        self.handler.on_move(&self.state);
    }
}

/// Registry of tracked surfaces sharing one set of document listeners
pub struct PointerTracker {
    surfaces: Vec<TrackedSurface>,
    host: Box<dyn ListenerHost>,
    listening: bool,
    pointer: Vec2,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::with_listener_host(Box::new(NoListeners))
    }

    pub fn with_listener_host(host: Box<dyn ListenerHost>) -> Self {
        Self {
            surfaces: Vec::new(),
            host,
            listening: false,
            pointer: Vec2::ZERO,
        }
    }

    /// Start tracking a surface. The first registration installs the shared listeners.
    pub fn register_surface(
        &mut self,
        id: SurfaceId,
        bounds: Box<dyn SurfaceBounds>,
        handler: Box<dyn PointerHandler>,
    ) -> Result<(), TrackerError> {
        if self.surfaces.iter().any(|s| s.id == id) {
            return Err(TrackerError::AlreadyRegistered(id));
        }
        self.surfaces.push(TrackedSurface {
            id,
            bounds,
            handler,
            state: PointerState::default(),
        });
        debug!("tracking surface {:?} ({} total)", id, self.surfaces.len());

        if !self.listening {
            self.host.install();
            self.listening = true;
            debug!("shared pointer listeners installed");
        }
        Ok(())
    }

    /// Stop tracking a surface. The last unregistration removes the shared listeners.
    pub fn unregister_surface(&mut self, id: SurfaceId) -> Result<(), TrackerError> {
        let index = self
            .surfaces
            .iter()
            .position(|s| s.id == id)
            .ok_or(TrackerError::UnknownSurface(id))?;
        self.surfaces.remove(index);
        debug!("released surface {:?} ({} left)", id, self.surfaces.len());

        if self.surfaces.is_empty() && self.listening {
            self.host.remove();
            self.listening = false;
            debug!("shared pointer listeners removed");
        }
        Ok(())
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn state(&self, id: SurfaceId) -> Option<PointerState> {
        self.surfaces.iter().find(|s| s.id == id).map(|s| s.state)
    }

    /// Last raw pointer coordinate seen by the tracker
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn pointer_move(&mut self, at: Vec2) {
        self.pointer = at;
        for surface in &mut self.surfaces {
            let rect = surface.bounds.bounding_rect();
            if rect.contains(at) {
                surface.update_position(at, &rect);
                if !surface.state.hovering {
                    surface.enter();
                }
                surface.moved();
            } else if surface.state.hovering && !surface.state.touching {
                surface.leave();
            }
        }
    }

    /// Pointer left the document
    pub fn pointer_leave(&mut self) {
        for surface in &mut self.surfaces {
            if surface.state.hovering {
                surface.leave();
            }
        }
    }

    /// Dispatch to every surface containing the point, regardless of hover
    pub fn click(&mut self, at: Vec2) {
        self.pointer = at;
        for surface in &mut self.surfaces {
            let rect = surface.bounds.bounding_rect();
            surface.update_position(at, &rect);
            if rect.contains(at) {
                surface.handler.on_click(&surface.state);
            }
        }
    }

    /// Only the first touch point is tracked
    pub fn touch_start(&mut self, touches: &[Vec2]) {
        let Some(&at) = touches.first() else {
            return;
        };
        self.pointer = at;
        for surface in &mut self.surfaces {
            let rect = surface.bounds.bounding_rect();
            if rect.contains(at) {
                surface.state.touching = true;
                surface.update_position(at, &rect);
                if !surface.state.hovering {
                    surface.enter();
                }
                surface.moved();
            }
        }
    }

    /// Surfaces being dragged keep receiving moves outside their rectangle
    pub fn touch_move(&mut self, touches: &[Vec2]) {
        let Some(&at) = touches.first() else {
            return;
        };
        self.pointer = at;
        for surface in &mut self.surfaces {
            let rect = surface.bounds.bounding_rect();
            surface.update_position(at, &rect);
            if rect.contains(at) {
                if !surface.state.hovering {
                    surface.state.touching = true;
                    surface.enter();
                }
                surface.moved();
            } else if surface.state.hovering && surface.state.touching {
                surface.moved();
            }
        }
    }

    /// Touch end and touch cancel
    pub fn touch_end(&mut self) {
        for surface in &mut self.surfaces {
            if surface.state.touching {
                surface.state.touching = false;
                if surface.state.hovering {
                    surface.leave();
                }
            }
        }
    }
}
