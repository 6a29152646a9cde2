mod controller;
mod engine;
mod loop_runner;
mod metrics;
mod rendering;
mod scheduler;

pub use controller::Controller2D;
pub use engine::{Engine, FrameReport};
pub use loop_runner::{
    run_windowed, run_windowed_with_metrics, HostError, LoopConfig, FRAME_INTERVAL_ENV_VAR,
};
pub use metrics::{MetricsHandle, RenderMetricsSnapshot};
pub use rendering::{
    CameraWindow, DrawingSurface, FrameBuffer, PixelsSurface, SurfaceDefaults, Transform2D,
    Viewport, DEFAULT_FONT, IDENTITY_TRANSFORM,
};
pub use scheduler::{FrameScheduler, FrameToken, TimerScheduler, FALLBACK_FRAME_INTERVAL};
