use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::content::{DataCache, FileImageLoader};

use super::metrics::MetricsAccumulator;
use super::scheduler::{TimerScheduler, FALLBACK_FRAME_INTERVAL};
use super::{Engine, MetricsHandle, PixelsSurface, Viewport};

pub const FRAME_INTERVAL_ENV_VAR: &str = "SCENE2D_FRAME_INTERVAL_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Minimum time between two scheduled frames.
    pub frame_interval: Duration,
    pub metrics_log_interval: Duration,
    /// Root directory for image sources loaded through the data cache.
    pub asset_root: PathBuf,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "scene2d".to_string(),
            window_width: 1280,
            window_height: 720,
            frame_interval: FALLBACK_FRAME_INTERVAL,
            metrics_log_interval: Duration::from_secs(1),
            asset_root: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize drawing surface: {0}")]
    CreateSurface(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Idle wake-up cadence while image loads are in flight.
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What the host does before the event loop goes back to sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WakePlan {
    Redraw,
    WaitUntil(Instant),
    Wait,
}

fn plan_wake(now: Instant, next_due: Option<Instant>, looping: bool, loading: bool) -> WakePlan {
    let load_deadline = loading.then(|| now + LOAD_POLL_INTERVAL);
    if looping {
        return match next_due {
            Some(due) if due > now => {
                WakePlan::WaitUntil(load_deadline.map_or(due, |deadline| deadline.min(due)))
            }
            _ => WakePlan::Redraw,
        };
    }
    match load_deadline {
        Some(deadline) => WakePlan::WaitUntil(deadline),
        None => WakePlan::Wait,
    }
}

pub fn run_windowed<F>(config: LoopConfig, setup: F) -> Result<(), HostError>
where
    F: FnOnce(&mut Engine<PixelsSurface>),
{
    run_windowed_with_metrics(config, MetricsHandle::default(), setup)
}

/// Opens a window, hands the engine to `setup`, starts the render loop and
/// drives it until the window closes.
pub fn run_windowed_with_metrics<F>(
    config: LoopConfig,
    metrics_handle: MetricsHandle,
    setup: F,
) -> Result<(), HostError>
where
    F: FnOnce(&mut Engine<PixelsSurface>),
{
    let event_loop = EventLoop::new().map_err(HostError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(HostError::CreateWindow)?,
    );
    let size = window.inner_size();
    let surface = PixelsSurface::new(Arc::clone(&window), size.width, size.height)
        .map_err(HostError::CreateSurface)?;

    let frame_interval = resolve_frame_interval(config.frame_interval);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let scheduler = TimerScheduler::new(frame_interval);
    let data_cache = DataCache::new(Arc::new(FileImageLoader::new(&config.asset_root)));
    let mut engine = Engine::new(surface, size.width, size.height, Box::new(scheduler))
        .with_data_cache(data_cache);

    info!(
        width = size.width,
        height = size.height,
        frame_interval_ms = frame_interval.as_millis() as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        asset_root = %config.asset_root.display(),
        "loop_config"
    );

    setup(&mut engine);
    engine.begin_render_loop();
    info!(layer_count = engine.map().layers().len(), "scene_loaded");

    event_loop.set_control_flow(ControlFlow::Wait);
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_frame_instant = Instant::now();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    resize_engine(&mut engine, new_size.width, new_size.height);
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    resize_engine(&mut engine, size.width, size.height);
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let Some(report) = engine.pump(now) else {
                        return;
                    };
                    if let Err(error) = engine.screen().present() {
                        warn!(error = %error, "renderer_present_failed");
                        window_target.exit();
                        return;
                    }
                    let frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;
                    metrics_accumulator.record_frame(frame_dt, &report);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            frame_time_ms = snapshot.frame_time_ms,
                            drawn_per_frame = snapshot.drawn_per_frame,
                            culled_per_frame = snapshot.culled_per_frame,
                            layer_count = report.layers,
                            "render_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                engine.poll_loads();
                let plan = plan_wake(
                    Instant::now(),
                    engine.next_frame_due(),
                    engine.is_looping(),
                    engine.data_cache().is_loading(),
                );
                match plan {
                    WakePlan::Redraw => {
                        window_target.set_control_flow(ControlFlow::Poll);
                        window.request_redraw();
                    }
                    WakePlan::WaitUntil(deadline) => {
                        window_target.set_control_flow(ControlFlow::WaitUntil(deadline));
                    }
                    WakePlan::Wait => window_target.set_control_flow(ControlFlow::Wait),
                }
            }
            Event::LoopExiting => {
                engine.stop_render_loop();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(HostError::EventLoopRun)
}

fn resize_engine(engine: &mut Engine<PixelsSurface>, width: u32, height: u32) {
    if width == 0 || height == 0 {
        return;
    }
    engine.set_size(width, height);
    engine.set_viewport(Viewport { width, height });
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn parse_frame_interval_ms(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}

fn resolve_frame_interval(config_interval: Duration) -> Duration {
    match env::var(FRAME_INTERVAL_ENV_VAR) {
        Ok(value) => match parse_frame_interval_ms(&value) {
            Some(interval) => interval,
            None => {
                warn!(
                    env_var = FRAME_INTERVAL_ENV_VAR,
                    value = value.as_str(),
                    "invalid frame interval env var value; falling back to config"
                );
                config_interval
            }
        },
        Err(env::VarError::NotPresent) => config_interval,
        Err(err) => {
            warn!(
                env_var = FRAME_INTERVAL_ENV_VAR,
                error = %err,
                "unable to read frame interval env var; falling back to config"
            );
            config_interval
        }
    }
}
