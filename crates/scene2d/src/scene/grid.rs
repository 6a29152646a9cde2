use crate::geometry::{CanvasColor, Point2D, Rotation2D, Vector2D};

const FALLBACK_CELL_SIZE: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct GridSettings {
    pub line_color: CanvasColor,
    pub line_thickness: f64,
    pub position: Point2D,
    pub rotation: Rotation2D,
    pub scale: Vector2D,
    pub size: Vector2D,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            line_color: CanvasColor::default(),
            line_thickness: 1.0,
            position: Point2D::origin(),
            rotation: Rotation2D::default(),
            scale: Vector2D::new(1.0, 1.0),
            size: Vector2D::new(FALLBACK_CELL_SIZE, FALLBACK_CELL_SIZE),
        }
    }
}

/// Background grid. `position` acts as the phase of the line pattern.
#[derive(Debug, Clone)]
pub struct Grid2D {
    line_color: CanvasColor,
    line_thickness: f64,
    position: Point2D,
    rotation: Rotation2D,
    scale: Vector2D,
    size: Vector2D,
}

impl Default for Grid2D {
    fn default() -> Self {
        Self::new(GridSettings::default())
    }
}

impl Grid2D {
    /// A negative or non-finite thickness falls back to 1.
    pub fn new(settings: GridSettings) -> Self {
        let mut grid = Self {
            line_color: settings.line_color,
            line_thickness: 1.0,
            position: settings.position,
            rotation: settings.rotation,
            scale: settings.scale,
            size: settings.size,
        };
        grid.set_line_thickness(settings.line_thickness);
        grid
    }

    pub fn block_calc_width(&self) -> f64 {
        cell_extent(self.size.x(), self.scale.x())
    }

    pub fn block_calc_height(&self) -> f64 {
        cell_extent(self.size.y(), self.scale.y())
    }

    pub fn line_color(&self) -> &CanvasColor {
        &self.line_color
    }

    pub fn line_thickness(&self) -> f64 {
        self.line_thickness
    }

    pub fn position(&self) -> Point2D {
        self.position
    }

    pub fn rotation(&self) -> Rotation2D {
        self.rotation
    }

    pub fn scale(&self) -> Vector2D {
        self.scale
    }

    pub fn size(&self) -> Vector2D {
        self.size
    }

    pub fn set_line_color(&mut self, color: CanvasColor) {
        self.line_color = color;
    }

    pub fn set_line_thickness(&mut self, thickness: f64) -> bool {
        if !thickness.is_finite() || thickness < 0.0 {
            return false;
        }
        self.line_thickness = thickness;
        true
    }

    pub fn set_position(&mut self, position: Point2D) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Rotation2D) {
        self.rotation = rotation;
    }

    pub fn set_scale(&mut self, scale: Vector2D) {
        self.scale = scale;
    }

    pub fn set_size(&mut self, size: Vector2D) {
        self.size = size;
    }
}

fn cell_extent(size: f64, scale: f64) -> f64 {
    let base = if size > 0.0 { size } else { FALLBACK_CELL_SIZE };
    if scale > 0.0 {
        base * scale
    } else {
        base
    }
}
