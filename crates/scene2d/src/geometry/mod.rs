mod color;
mod shapes;
mod vector;

pub use color::{parse_css_color, CanvasColor, Rgba, TRANSPARENT};
pub use shapes::{Line2D, Line3D, Polygon2D, Rotation2D};
pub use vector::{Operand2D, Operand3D, Point2D, Point3D, Vector2D, Vector3D, ANY};
