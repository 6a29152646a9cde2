use crate::geometry::{Point2D, Vector2D};

/// Camera state: world position of the top-left corner and a zoom factor per
/// axis (`2.0` shows twice as much of the world).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controller2D {
    camera_position: Point2D,
    scale: Vector2D,
}

impl Default for Controller2D {
    fn default() -> Self {
        Self {
            camera_position: Point2D::origin(),
            scale: Vector2D::new(1.0, 1.0),
        }
    }
}

impl Controller2D {
    pub fn camera_position(&self) -> Point2D {
        self.camera_position
    }

    pub fn scale(&self) -> Vector2D {
        self.scale
    }

    pub fn set_camera_position(&mut self, position: Point2D) {
        self.camera_position = position;
    }

    pub fn set_scale(&mut self, scale: Vector2D) -> bool {
        if scale.x() <= 0.0 || scale.y() <= 0.0 {
            return false;
        }
        self.scale = scale;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_rejects_non_positive_components() {
        let mut controller = Controller2D::default();
        assert!(!controller.set_scale(Vector2D::new(0.0, 1.0)));
        assert!(!controller.set_scale(Vector2D::new(1.0, -2.0)));
        assert_eq!(controller.scale(), Vector2D::new(1.0, 1.0));
        assert!(controller.set_scale(Vector2D::new(0.5, 2.0)));
        assert_eq!(controller.scale(), Vector2D::new(0.5, 2.0));
    }
}
