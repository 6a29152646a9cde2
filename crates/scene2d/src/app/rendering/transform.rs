use crate::app::Controller2D;
use crate::geometry::Point2D;

/// Reference size the camera window is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

const CULL_MARGIN: f64 = 1.0;

/// World-space rectangle seen by the camera for one frame, with a one unit
/// margin on every side for culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraWindow {
    pub position: Point2D,
    pub width: f64,
    pub height: f64,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl CameraWindow {
    pub fn new(controller: &Controller2D, viewport: Viewport) -> Self {
        let position = controller.camera_position();
        let width = viewport.width as f64 * controller.scale().x();
        let height = viewport.height as f64 * controller.scale().y();
        Self {
            position,
            width,
            height,
            min_x: position.x() - CULL_MARGIN,
            max_x: position.x() + width + CULL_MARGIN,
            min_y: position.y() - CULL_MARGIN,
            max_y: position.y() + height + CULL_MARGIN,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite())
    }

    pub fn is_culled(&self, position: Point2D, width: f64, height: f64) -> bool {
        position.x() > self.max_x
            || position.x() + width < self.min_x
            || position.y() > self.max_y
            || position.y() + height < self.min_y
    }

    /// Screen pixels per world unit on each axis.
    pub fn screen_ratio(&self, screen: (u32, u32)) -> (f64, f64) {
        (
            screen.0 as f64 / self.width,
            screen.1 as f64 / self.height,
        )
    }

    /// Top-left draw position of a world point. The camera offset is not
    /// scaled by the screen ratio.
    pub fn world_to_screen(&self, position: Point2D) -> (f64, f64) {
        (
            position.x() - self.position.x(),
            position.y() - self.position.y(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector2D;

    fn viewport() -> Viewport {
        Viewport {
            width: 800,
            height: 600,
        }
    }

    #[test]
    fn window_scales_viewport_and_pads_bounds() {
        let mut controller = Controller2D::default();
        controller.set_camera_position(Point2D::new(10.0, 20.0));
        controller.set_scale(Vector2D::new(2.0, 0.5));
        let window = CameraWindow::new(&controller, viewport());
        assert_eq!((window.width, window.height), (1600.0, 300.0));
        assert_eq!((window.min_x, window.max_x), (9.0, 1611.0));
        assert_eq!((window.min_y, window.max_y), (19.0, 321.0));
        assert_eq!(window.screen_ratio((800, 600)), (0.5, 2.0));
    }

    #[test]
    fn object_left_of_window_is_culled() {
        let mut controller = Controller2D::default();
        controller.set_camera_position(Point2D::new(100.0, 0.0));
        let window = CameraWindow::new(&controller, viewport());
        assert!(window.is_culled(Point2D::new(50.0, 10.0), 40.0, 10.0));
        assert!(!window.is_culled(Point2D::new(60.0, 10.0), 40.0, 10.0));
        assert!(window.is_culled(Point2D::new(902.0, 10.0), 1.0, 1.0));
    }

    #[test]
    fn zero_viewport_is_degenerate() {
        let window = CameraWindow::new(
            &Controller2D::default(),
            Viewport {
                width: 0,
                height: 600,
            },
        );
        assert!(window.is_degenerate());
        assert!(!CameraWindow::new(&Controller2D::default(), viewport()).is_degenerate());
    }
}
