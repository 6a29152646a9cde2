use tracing::error;

use super::vector::{Point2D, Point3D, Vector2D, Vector3D};

/// Rotation in degrees, clockwise-positive. Values are not normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotation2D {
    degrees: f64,
}

impl Rotation2D {
    pub fn new(degrees: f64) -> Self {
        let mut rotation = Self::default();
        rotation.set_degrees(degrees);
        rotation
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    pub fn set_degrees(&mut self, degrees: f64) -> bool {
        if !degrees.is_finite() {
            return false;
        }
        self.degrees = degrees;
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Line2D {
    point: Point2D,
    direction: Vector2D,
}

impl Line2D {
    pub fn new(point: Point2D, direction: Vector2D) -> Self {
        Self { point, direction }
    }

    pub fn point(&self) -> Point2D {
        self.point
    }

    pub fn direction(&self) -> Vector2D {
        self.direction
    }

    pub fn set_point(&mut self, point: Point2D) {
        self.point = point;
    }

    pub fn set_direction(&mut self, direction: Vector2D) {
        self.direction = direction;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Line3D {
    point: Point3D,
    direction: Vector3D,
}

impl Line3D {
    pub fn new(point: Point3D, direction: Vector3D) -> Self {
        Self { point, direction }
    }

    pub fn point(&self) -> Point3D {
        self.point
    }

    pub fn direction(&self) -> Vector3D {
        self.direction
    }

    pub fn set_point(&mut self, point: Point3D) {
        self.point = point;
    }

    pub fn set_direction(&mut self, direction: Vector3D) {
        self.direction = direction;
    }
}

/// Closed polygon. A valid shape needs at least three points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon2D {
    points: Vec<Point2D>,
}

impl Polygon2D {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn set_points(&mut self, points: Vec<Point2D>) {
        self.points = points;
    }

    /// Sum of edge lengths, wrapping last to first. Degenerate shapes log an
    /// error and report 0.
    pub fn perimeter(&self) -> f64 {
        let count = self.points.len();
        if count < 3 {
            error!(
                point_count = count,
                "polygon_perimeter_invalid_shape_needs_three_points"
            );
            return 0.0;
        }
        (0..count)
            .map(|i| Vector2D::subtract([self.points[(i + 1) % count], self.points[i]]).magnitude())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn unit_square_perimeter_is_four() {
        let square = Polygon2D::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ]);
        assert_eq!(square.perimeter(), 4.0);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            let bytes = self.0.lock().expect("log buffer").clone();
            String::from_utf8(bytes).expect("utf8 logs")
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, logs.text())
    }

    #[test]
    fn two_point_polygon_reports_zero_and_logs_error() {
        let line = Polygon2D::new(vec![Point2D::new(0.0, 0.0), Point2D::new(5.0, 0.0)]);
        let (perimeter, logs) = with_captured_logs(|| line.perimeter());
        assert_eq!(perimeter, 0.0);
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("polygon_perimeter_invalid_shape_needs_three_points"));
        assert!(logs.contains("point_count=2"));

        assert_eq!(Polygon2D::default().perimeter(), 0.0);
    }

    #[test]
    fn valid_polygon_logs_nothing() {
        let triangle = Polygon2D::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
        ]);
        let (_, logs) = with_captured_logs(|| triangle.perimeter());
        assert!(logs.is_empty());
    }

    #[test]
    fn triangle_perimeter_wraps_last_to_first() {
        let triangle = Polygon2D::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(3.0, 0.0),
            Point2D::new(3.0, 4.0),
        ]);
        assert_eq!(triangle.perimeter(), 12.0);
    }

    #[test]
    fn rotation_is_not_normalized_and_rejects_nan() {
        let mut rotation = Rotation2D::new(725.0);
        assert_eq!(rotation.degrees(), 725.0);
        assert!(!rotation.set_degrees(f64::NAN));
        assert_eq!(rotation.degrees(), 725.0);
        assert!(rotation.set_degrees(-90.0));
        assert_eq!(rotation.degrees(), -90.0);
    }

    #[test]
    fn line_defaults_to_origin_and_zero_direction() {
        let line = Line2D::default();
        assert_eq!(line.point(), Point2D::origin());
        assert_eq!(line.direction(), Vector2D::zero());
    }
}
