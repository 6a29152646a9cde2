use crate::geometry::CanvasColor;

use super::grid::Grid2D;
use super::object::PassiveObject2D;

#[derive(Debug, Clone)]
pub enum BackgroundData {
    Color(CanvasColor),
    Passive(PassiveObject2D),
    Grid(Grid2D),
}

impl Default for BackgroundData {
    fn default() -> Self {
        BackgroundData::Color(CanvasColor::transparent())
    }
}

impl From<CanvasColor> for BackgroundData {
    fn from(color: CanvasColor) -> Self {
        BackgroundData::Color(color)
    }
}

impl From<PassiveObject2D> for BackgroundData {
    fn from(object: PassiveObject2D) -> Self {
        BackgroundData::Passive(object)
    }
}

impl From<Grid2D> for BackgroundData {
    fn from(grid: Grid2D) -> Self {
        BackgroundData::Grid(grid)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Background2D {
    data: BackgroundData,
}

impl Background2D {
    pub fn new(data: impl Into<BackgroundData>) -> Self {
        Self { data: data.into() }
    }

    pub fn data(&self) -> &BackgroundData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut BackgroundData {
        &mut self.data
    }

    pub fn set_data(&mut self, data: impl Into<BackgroundData>) {
        self.data = data.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_background_is_transparent_color() {
        let background = Background2D::default();
        let BackgroundData::Color(color) = background.data() else {
            panic!("expected color background");
        };
        assert!(color.is_transparent());
    }

    #[test]
    fn set_data_switches_kind() {
        let mut background = Background2D::default();
        background.set_data(Grid2D::default());
        assert!(matches!(background.data(), BackgroundData::Grid(_)));
    }
}
