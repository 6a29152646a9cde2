use std::time::Instant;

use tracing::{debug, info, trace, warn};

use crate::content::DataCache;
use crate::geometry::Rgba;
use crate::scene::prepare::raster_dimension;
use crate::scene::{
    ActiveObject2D, BackgroundData, Grid2D, Map2D, PassiveObject2D, RasterRegion, SceneObject,
};

use super::controller::Controller2D;
use super::rendering::{CameraWindow, DrawingSurface, SurfaceDefaults, Viewport};
use super::scheduler::{FrameScheduler, FrameToken};

const CLEAR_COLOR: Rgba = [0, 0, 0, 255];
const MAX_GRID_LINES: usize = 16_384;

/// What one render step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub layers: usize,
    pub drawn: usize,
    pub culled: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Idle,
    Looping { pending: FrameToken },
}

/// Owns the scene, the camera and the drawing surface and turns them into
/// frames on the scheduler's cadence.
pub struct Engine<S: DrawingSurface> {
    controller: Controller2D,
    data_cache: DataCache,
    map: Map2D,
    screen: S,
    width: u32,
    height: u32,
    viewport: Viewport,
    scheduler: Box<dyn FrameScheduler>,
    state: LoopState,
}

impl<S: DrawingSurface> Engine<S> {
    /// Zero dimensions are raised to 1. The viewport starts out equal to the
    /// screen size.
    pub fn new(screen: S, width: u32, height: u32, scheduler: Box<dyn FrameScheduler>) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut engine = Self {
            controller: Controller2D::default(),
            data_cache: DataCache::default(),
            map: Map2D::new(width as f64, height as f64),
            screen,
            width,
            height,
            viewport: Viewport { width, height },
            scheduler,
            state: LoopState::Idle,
        };
        engine.prepare_renderer();
        engine
    }

    pub fn with_data_cache(mut self, data_cache: DataCache) -> Self {
        self.data_cache = data_cache;
        self
    }

    pub fn controller(&self) -> &Controller2D {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller2D {
        &mut self.controller
    }

    pub fn data_cache(&self) -> &DataCache {
        &self.data_cache
    }

    pub fn data_cache_mut(&mut self) -> &mut DataCache {
        &mut self.data_cache
    }

    pub fn map(&self) -> &Map2D {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map2D {
        &mut self.map
    }

    /// Swaps in a new map and hands back the previous one.
    pub fn set_map(&mut self, map: Map2D) -> Map2D {
        std::mem::replace(&mut self.map, map)
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    pub fn set_screen(&mut self, screen: S) -> S {
        let previous = std::mem::replace(&mut self.screen, screen);
        self.prepare_renderer();
        previous
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_width(&mut self, width: u32) -> bool {
        self.set_size(width, self.height)
    }

    pub fn set_height(&mut self, height: u32) -> bool {
        self.set_size(self.width, height)
    }

    /// Resizes the screen. Zero in either dimension is rejected.
    pub fn set_size(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.width = width;
        self.height = height;
        self.prepare_renderer();
        true
    }

    /// Sets the reference size the camera window is derived from.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.prepare_renderer();
    }

    /// (Re)configures the surface for the current screen size. Failures are
    /// logged and reported as `false`.
    pub fn prepare_renderer(&mut self) -> bool {
        let defaults = SurfaceDefaults::default();
        match self.screen.configure(self.width, self.height, &defaults) {
            Ok(()) => {
                debug!(width = self.width, height = self.height, "renderer_prepared");
                true
            }
            Err(error) => {
                warn!(
                    width = self.width,
                    height = self.height,
                    error = %error,
                    "renderer_configure_failed"
                );
                false
            }
        }
    }

    pub fn is_looping(&self) -> bool {
        matches!(self.state, LoopState::Looping { .. })
    }

    pub fn begin_render_loop(&mut self) {
        if self.is_looping() {
            return;
        }
        let pending = self.scheduler.schedule_frame();
        self.state = LoopState::Looping { pending };
        info!(token = pending.id(), "render_loop_started");
    }

    pub fn stop_render_loop(&mut self) {
        let LoopState::Looping { pending } = self.state else {
            return;
        };
        self.scheduler.cancel_frame(pending);
        self.state = LoopState::Idle;
        info!(token = pending.id(), "render_loop_stopped");
    }

    pub fn set_render_loop(&mut self, enabled: bool) {
        if enabled {
            self.begin_render_loop();
        } else {
            self.stop_render_loop();
        }
    }

    /// When the pending frame becomes due, if the loop is running and the
    /// scheduler knows.
    pub fn next_frame_due(&self) -> Option<Instant> {
        match self.state {
            LoopState::Looping { .. } => self.scheduler.next_due(),
            LoopState::Idle => None,
        }
    }

    /// Applies finished data loads. See [`DataCache::poll_loads`].
    pub fn poll_loads(&mut self) -> usize {
        self.data_cache.poll_loads()
    }

    /// Host entry point: applies finished loads, then runs a frame if the
    /// scheduler reports the pending frame as due.
    pub fn pump(&mut self, now: Instant) -> Option<FrameReport> {
        self.data_cache.poll_loads();
        let LoopState::Looping { pending } = self.state else {
            return None;
        };
        let due = self.scheduler.poll_due(now)?;
        if due != pending {
            trace!(due = due.id(), pending = pending.id(), "stale_frame_ignored");
            return None;
        }
        Some(self.core_render_step())
    }

    /// Draws one frame and, while looping, schedules the next one.
    pub fn core_render_step(&mut self) -> FrameReport {
        let screen_size = (self.width as f64, self.height as f64);
        self.screen
            .fill_rect(0.0, 0.0, screen_size.0, screen_size.1, CLEAR_COLOR);

        let window = CameraWindow::new(&self.controller, self.viewport);
        let mut report = FrameReport {
            layers: self.map.layers().len(),
            ..FrameReport::default()
        };

        if window.is_degenerate() {
            debug!(
                camera_width = window.width,
                camera_height = window.height,
                "render_step_skipped_degenerate_camera"
            );
        } else {
            let ratio = window.screen_ratio((self.width, self.height));
            let mut frame = FrameDraw {
                screen: &mut self.screen,
                window: &window,
                ratio,
                screen_size,
                report: &mut report,
            };
            for layer in self.map.layers() {
                match layer.background().data() {
                    BackgroundData::Color(color) => {
                        if !color.is_transparent() {
                            frame.fill_screen(color.rgba());
                        }
                    }
                    BackgroundData::Grid(grid) => frame.draw_grid(grid),
                    BackgroundData::Passive(object) => frame.draw_passive(object),
                }
                for object in layer.objects() {
                    match object {
                        SceneObject::Passive(object) => frame.draw_passive(object),
                        SceneObject::Active(object) => frame.draw_active(object),
                    }
                }
            }
        }

        trace!(
            layers = report.layers,
            drawn = report.drawn,
            culled = report.culled,
            "frame_rendered"
        );
        if let LoopState::Looping { pending } = &mut self.state {
            *pending = self.scheduler.schedule_frame();
        }
        report
    }
}

/// Borrowed state for drawing the layers of one frame.
struct FrameDraw<'a, S: DrawingSurface> {
    screen: &'a mut S,
    window: &'a CameraWindow,
    ratio: (f64, f64),
    screen_size: (f64, f64),
    report: &'a mut FrameReport,
}

impl<S: DrawingSurface> FrameDraw<'_, S> {
    fn fill_screen(&mut self, color: Rgba) {
        self.screen
            .fill_rect(0.0, 0.0, self.screen_size.0, self.screen_size.1, color);
    }

    fn draw_grid(&mut self, grid: &Grid2D) {
        let step_x = grid.block_calc_width() * self.ratio.0;
        let step_y = grid.block_calc_height() * self.ratio.1;
        if !is_usable_step(step_x) || !is_usable_step(step_y) {
            return;
        }
        let color = grid.line_color().rgba();
        let thickness = grid.line_thickness();
        let offset_x = grid.position().x() % step_x;
        let offset_y = grid.position().y() % step_y;

        for x in line_positions(offset_x, step_x, self.window.width) {
            self.screen
                .stroke_line((x, 0.0), (x, self.screen_size.1), thickness, color);
        }
        for y in line_positions(offset_y, step_y, self.window.height) {
            self.screen
                .stroke_line((0.0, y), (self.screen_size.0, y), thickness, color);
        }
    }

    fn draw_passive(&mut self, object: &PassiveObject2D) {
        let size = (object.render_width(), object.render_height());
        if self.window.is_culled(object.position(), size.0, size.1) {
            self.report.culled += 1;
            return;
        }
        let (x, y) = self.window.world_to_screen(object.position());
        let (width, height) = self.scaled(size);
        self.screen
            .draw_image(object.raw_image_data(), x, y, width, height);
        self.report.drawn += 1;
    }

    fn draw_active(&mut self, object: &ActiveObject2D) {
        let size = object.render_size();
        if self.window.is_culled(object.position(), size.0, size.1) {
            self.report.culled += 1;
            return;
        }
        self.report.drawn += 1;
        let (x, y) = self.window.world_to_screen(object.position());
        let (width, height) = self.scaled(size);
        let full = (raster_dimension(width), raster_dimension(height));
        let Some(region) = visible_region((x, y), full, self.screen_size) else {
            return;
        };
        let raster = object.source().rasterize_region(full.0, full.1, region);
        if region == RasterRegion::full(full.0, full.1) {
            self.screen.draw_image(&raster, x, y, width, height);
        } else {
            self.screen.draw_image(
                &raster,
                x + f64::from(region.x),
                y + f64::from(region.y),
                f64::from(region.width),
                f64::from(region.height),
            );
        }
    }

    fn scaled(&self, size: (f64, f64)) -> (f64, f64) {
        (size.0 * self.ratio.0, size.1 * self.ratio.1)
    }
}

/// Part of a `full`-sized raster drawn at `origin` that falls on the screen.
fn visible_region(
    origin: (f64, f64),
    full: (u32, u32),
    screen: (f64, f64),
) -> Option<RasterRegion> {
    let (left, right) = visible_span(origin.0, full.0, screen.0)?;
    let (top, bottom) = visible_span(origin.1, full.1, screen.1)?;
    Some(RasterRegion {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    })
}

fn visible_span(start: f64, len: u32, limit: f64) -> Option<(u32, u32)> {
    if !start.is_finite() || !limit.is_finite() {
        return None;
    }
    let low = (-start).floor().max(0.0);
    let high = (limit - start).ceil().min(f64::from(len));
    if low >= high {
        return None;
    }
    Some((low as u32, high as u32))
}

fn is_usable_step(step: f64) -> bool {
    step.is_finite() && step > 0.0
}

/// `offset + k * step` for every `k >= 0` that stays below `limit`.
fn line_positions(offset: f64, step: f64, limit: f64) -> impl Iterator<Item = f64> {
    let count = if offset < limit {
        ((limit - offset) / step).ceil().min(MAX_GRID_LINES as f64) as usize
    } else {
        0
    };
    (0..count).map(move |k| offset + k as f64 * step)
}
