/// Size component meaning "let the renderer decide" (natural image size).
pub const ANY: f64 = -1.0;

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn assign_finite(slot: &mut f64, value: f64) -> bool {
    if !value.is_finite() {
        return false;
    }
    *slot = value;
    true
}

/// Vector in a 2D scene.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2D {
    x: f64,
    y: f64,
}

impl Vector2D {
    /// Non-finite components are replaced by 0.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: finite_or_zero(x),
            y: finite_or_zero(y),
        }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// The `(ANY, ANY)` size sentinel.
    pub const fn any_size() -> Self {
        Self { x: ANY, y: ANY }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn set_x(&mut self, x: f64) -> bool {
        assign_finite(&mut self.x, x)
    }

    pub fn set_y(&mut self, y: f64) -> bool {
        assign_finite(&mut self.y, y)
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Sums every valid operand; no valid operand yields the zero vector.
    pub fn add<I>(operands: I) -> Vector2D
    where
        I: IntoIterator,
        I::Item: Operand2D,
    {
        operands
            .into_iter()
            .filter_map(|operand| operand.as_vector2d())
            .fold(Vector2D::zero(), |acc, v| Vector2D {
                x: acc.x + v.x,
                y: acc.y + v.y,
            })
    }

    /// First valid operand minus every following valid operand.
    pub fn subtract<I>(operands: I) -> Vector2D
    where
        I: IntoIterator,
        I::Item: Operand2D,
    {
        let mut valid = operands.into_iter().filter_map(|operand| operand.as_vector2d());
        let Some(first) = valid.next() else {
            return Vector2D::zero();
        };
        valid.fold(first, |acc, v| Vector2D {
            x: acc.x - v.x,
            y: acc.y - v.y,
        })
    }
}

/// Point in a 2D scene. Behaves as a vector for [`Vector2D::add`] and
/// [`Vector2D::subtract`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point2D {
    x: f64,
    y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: finite_or_zero(x),
            y: finite_or_zero(y),
        }
    }

    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn set_x(&mut self, x: f64) -> bool {
        assign_finite(&mut self.x, x)
    }

    pub fn set_y(&mut self, y: f64) -> bool {
        assign_finite(&mut self.y, y)
    }
}

impl From<Point2D> for Vector2D {
    fn from(point: Point2D) -> Self {
        Vector2D {
            x: point.x,
            y: point.y,
        }
    }
}

/// Anything accepted by the variadic 2D vector operations.
///
/// `None` is the "operand of the wrong kind" case and is skipped.
pub trait Operand2D {
    fn as_vector2d(&self) -> Option<Vector2D>;
}

impl Operand2D for Vector2D {
    fn as_vector2d(&self) -> Option<Vector2D> {
        Some(*self)
    }
}

impl Operand2D for Point2D {
    fn as_vector2d(&self) -> Option<Vector2D> {
        Some((*self).into())
    }
}

impl<T: Operand2D + ?Sized> Operand2D for &T {
    fn as_vector2d(&self) -> Option<Vector2D> {
        (**self).as_vector2d()
    }
}

impl<T: Operand2D> Operand2D for Option<T> {
    fn as_vector2d(&self) -> Option<Vector2D> {
        self.as_ref().and_then(Operand2D::as_vector2d)
    }
}

/// Vector in a 3D scene.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3D {
    x: f64,
    y: f64,
    z: f64,
}

impl Vector3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: finite_or_zero(x),
            y: finite_or_zero(y),
            z: finite_or_zero(z),
        }
    }

    pub const fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn set_x(&mut self, x: f64) -> bool {
        assign_finite(&mut self.x, x)
    }

    pub fn set_y(&mut self, y: f64) -> bool {
        assign_finite(&mut self.y, y)
    }

    pub fn set_z(&mut self, z: f64) -> bool {
        assign_finite(&mut self.z, z)
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn add<I>(operands: I) -> Vector3D
    where
        I: IntoIterator,
        I::Item: Operand3D,
    {
        operands
            .into_iter()
            .filter_map(|operand| operand.as_vector3d())
            .fold(Vector3D::zero(), |acc, v| Vector3D {
                x: acc.x + v.x,
                y: acc.y + v.y,
                z: acc.z + v.z,
            })
    }

    pub fn subtract<I>(operands: I) -> Vector3D
    where
        I: IntoIterator,
        I::Item: Operand3D,
    {
        let mut valid = operands.into_iter().filter_map(|operand| operand.as_vector3d());
        let Some(first) = valid.next() else {
            return Vector3D::zero();
        };
        valid.fold(first, |acc, v| Vector3D {
            x: acc.x - v.x,
            y: acc.y - v.y,
            z: acc.z - v.z,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point3D {
    x: f64,
    y: f64,
    z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: finite_or_zero(x),
            y: finite_or_zero(y),
            z: finite_or_zero(z),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn set_x(&mut self, x: f64) -> bool {
        assign_finite(&mut self.x, x)
    }

    pub fn set_y(&mut self, y: f64) -> bool {
        assign_finite(&mut self.y, y)
    }

    pub fn set_z(&mut self, z: f64) -> bool {
        assign_finite(&mut self.z, z)
    }
}

impl From<Point3D> for Vector3D {
    fn from(point: Point3D) -> Self {
        Vector3D {
            x: point.x,
            y: point.y,
            z: point.z,
        }
    }
}

pub trait Operand3D {
    fn as_vector3d(&self) -> Option<Vector3D>;
}

impl Operand3D for Vector3D {
    fn as_vector3d(&self) -> Option<Vector3D> {
        Some(*self)
    }
}

impl Operand3D for Point3D {
    fn as_vector3d(&self) -> Option<Vector3D> {
        Some((*self).into())
    }
}

impl<T: Operand3D + ?Sized> Operand3D for &T {
    fn as_vector3d(&self) -> Option<Vector3D> {
        (**self).as_vector3d()
    }
}

impl<T: Operand3D> Operand3D for Option<T> {
    fn as_vector3d(&self) -> Option<Vector3D> {
        self.as_ref().and_then(Operand3D::as_vector3d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_components_read_back_unchanged() {
        for (x, y) in [(0.0, 0.0), (1.5, -2.25), (-1e9, 3e-7)] {
            let v = Vector2D::new(x, y);
            assert_eq!((v.x(), v.y()), (x, y));
        }
    }

    #[test]
    fn nan_component_becomes_zero() {
        let v = Vector2D::new(f64::NAN, 4.0);
        assert_eq!((v.x(), v.y()), (0.0, 4.0));
        let v = Vector2D::new(3.0, f64::NAN);
        assert_eq!((v.x(), v.y()), (3.0, 0.0));
        let p = Point3D::new(f64::NAN, 1.0, f64::INFINITY);
        assert_eq!((p.x(), p.y(), p.z()), (0.0, 1.0, 0.0));
    }

    #[test]
    fn non_finite_setter_keeps_previous_value() {
        let mut v = Vector2D::new(1.0, 2.0);
        assert!(!v.set_x(f64::NAN));
        assert!(!v.set_y(f64::NEG_INFINITY));
        assert_eq!((v.x(), v.y()), (1.0, 2.0));
        assert!(v.set_x(7.0));
        assert_eq!(v.x(), 7.0);
    }

    #[test]
    fn magnitude_is_euclidean_norm() {
        assert_eq!(Vector2D::new(3.0, 4.0).magnitude(), 5.0);
        assert_eq!(Vector3D::new(2.0, 3.0, 6.0).magnitude(), 7.0);
    }

    #[test]
    fn add_without_valid_operands_is_zero() {
        assert_eq!(Vector2D::add(std::iter::empty::<Vector2D>()), Vector2D::zero());
        assert_eq!(
            Vector2D::add([None::<Vector2D>, None]),
            Vector2D::zero()
        );
    }

    #[test]
    fn add_is_componentwise_and_order_independent() {
        let a = Vector2D::new(1.0, 2.0);
        let b = Point2D::new(-4.0, 0.5);
        let c = Vector2D::new(10.0, 10.0);
        let forward = Vector2D::add([&a as &dyn Operand2D, &b, &c]);
        let backward = Vector2D::add([&c as &dyn Operand2D, &b, &a]);
        assert_eq!(forward, Vector2D::new(7.0, 12.5));
        assert_eq!(forward, backward);
    }

    #[test]
    fn subtract_uses_first_valid_operand_as_base() {
        let a = Vector2D::new(10.0, 10.0);
        let b = Vector2D::new(1.0, 2.0);
        let c = Vector2D::new(3.0, 4.0);
        assert_eq!(Vector2D::subtract([a, b, c]), Vector2D::new(6.0, 4.0));
        assert_eq!(
            Vector2D::subtract([None, Some(a), None, Some(b)]),
            Vector2D::new(9.0, 8.0)
        );
        assert_eq!(Vector2D::subtract([None::<Point2D>]), Vector2D::zero());
    }

    #[test]
    fn vector3d_operations_fold_all_axes() {
        let a = Vector3D::new(1.0, 1.0, 1.0);
        let p = Point3D::new(2.0, 3.0, 4.0);
        assert_eq!(
            Vector3D::add([&a as &dyn Operand3D, &p]),
            Vector3D::new(3.0, 4.0, 5.0)
        );
        assert_eq!(
            Vector3D::subtract([&p as &dyn Operand3D, &a]),
            Vector3D::new(1.0, 2.0, 3.0)
        );
    }
}
