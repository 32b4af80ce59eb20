pub mod camera;
pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod ensemble;
pub mod gradient;
pub mod integrator;
pub mod pointer;
pub mod runtime;
pub mod scene;

pub use camera::{Camera, Viewport, WorldSize};
pub use config::{ConfigError, SimulationConfig, MAX_COUNT, MAX_EXTENT};
pub use driver::{Driver, FrameRequest, FrameTime, LifecycleState};
pub use ensemble::{Ensemble, EnsembleError};
pub use gradient::Gradient;
pub use integrator::step;
pub use pointer::{
    PointerHandler, PointerState, PointerTracker, Rect, SurfaceBounds, SurfaceId, TrackerError,
};
pub use runtime::{measure, run_headless, SimulationResult, SimulationStats};
pub use scene::{Ballpit, BallpitError, InstanceTransform, PointerTarget, RenderBackend};
