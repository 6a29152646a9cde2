use std::ops::{Deref, DerefMut};

use super::key::{Key, SceneError};
use super::layer::Layer2D;

/// Ordered layer collection.
///
/// Layers are kept sorted by ascending order number at all times, ties in
/// insertion order. A layer borrowed through [`Map2D::get_layer_mut`] is put
/// back in place when the borrow ends.
#[derive(Debug, Clone, Default)]
pub struct Map2D {
    width: f64,
    height: f64,
    layers: Vec<Layer2D>,
}

impl Map2D {
    pub fn new(width: f64, height: f64) -> Self {
        let mut map = Self::default();
        map.set_width(width);
        map.set_height(height);
        map
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_width(&mut self, width: f64) -> bool {
        if !width.is_finite() {
            return false;
        }
        self.width = width;
        true
    }

    pub fn set_height(&mut self, height: f64) -> bool {
        if !height.is_finite() {
            return false;
        }
        self.height = height;
        true
    }

    /// Inserts after every layer with the same or lower order number and
    /// returns the layer's name. Names are not checked for uniqueness.
    pub fn add_layer(&mut self, layer: Layer2D) -> String {
        let name = layer.name().to_string();
        let index = self
            .layers
            .partition_point(|existing| existing.order_num() <= layer.order_num());
        self.layers.insert(index, layer);
        name
    }

    pub fn get_layer<'k>(&self, name: impl Into<Key<'k>>) -> Result<&Layer2D, SceneError> {
        let index = self.position_of(name.into())?;
        Ok(&self.layers[index])
    }

    pub fn get_layer_mut<'k>(
        &mut self,
        name: impl Into<Key<'k>>,
    ) -> Result<LayerMut<'_>, SceneError> {
        let index = self.position_of(name.into())?;
        let order_num = self.layers[index].order_num();
        Ok(LayerMut {
            layers: &mut self.layers,
            index,
            order_num,
        })
    }

    pub fn remove_layer<'k>(&mut self, name: impl Into<Key<'k>>) -> Result<Layer2D, SceneError> {
        let index = self.position_of(name.into())?;
        Ok(self.layers.remove(index))
    }

    pub fn remove_all_layers(&mut self) {
        self.layers.clear();
    }

    /// Ascending order number, ties in insertion order.
    pub fn layers(&self) -> &[Layer2D] {
        &self.layers
    }

    fn position_of(&self, key: Key<'_>) -> Result<usize, SceneError> {
        let name = key.require_str("name")?;
        self.layers
            .iter()
            .position(|layer| layer.name() == name)
            .ok_or_else(|| SceneError::LayerNotFound {
                name: name.to_string(),
            })
    }
}

/// Mutable borrow of a layer inside a [`Map2D`].
pub struct LayerMut<'a> {
    layers: &'a mut Vec<Layer2D>,
    index: usize,
    order_num: i32,
}

impl Deref for LayerMut<'_> {
    type Target = Layer2D;

    fn deref(&self) -> &Layer2D {
        &self.layers[self.index]
    }
}

impl DerefMut for LayerMut<'_> {
    fn deref_mut(&mut self) -> &mut Layer2D {
        &mut self.layers[self.index]
    }
}

impl Drop for LayerMut<'_> {
    fn drop(&mut self) {
        if self.layers[self.index].order_num() != self.order_num {
            self.layers.sort_by_key(Layer2D::order_num);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(map: &Map2D) -> Vec<&str> {
        map.layers().iter().map(Layer2D::name).collect()
    }

    fn map_with_orders(orders: &[(&str, i32)]) -> Map2D {
        let mut map = Map2D::new(800.0, 600.0);
        for (name, order) in orders {
            map.add_layer(Layer2D::new(*name, *order));
        }
        map
    }

    #[test]
    fn layers_sort_ascending_with_stable_ties() {
        let map = map_with_orders(&[("a", 2), ("b", -1), ("c", 2), ("d", 0)]);
        assert_eq!(names(&map), ["b", "d", "a", "c"]);
        let orders: Vec<i32> = map.layers().iter().map(Layer2D::order_num).collect();
        assert_eq!(orders, [-1, 0, 2, 2]);
    }

    #[test]
    fn add_layer_returns_name() {
        let mut map = Map2D::default();
        assert_eq!(map.add_layer(Layer2D::new("sky", 0)), "sky");
    }

    #[test]
    fn missing_layer_is_not_found_and_non_string_is_type_error() {
        let mut map = map_with_orders(&[("a", 0)]);
        assert_eq!(
            map.get_layer("missing").map(Layer2D::name),
            Err(SceneError::LayerNotFound {
                name: "missing".to_string()
            })
        );
        assert_eq!(
            map.get_layer(42_i64).map(Layer2D::name),
            Err(SceneError::ArgumentType {
                argument: "name",
                expected: "string",
                found: "number",
            })
        );
        assert!(map.remove_layer("missing").is_err());
        assert_eq!(names(&map), ["a"]);
    }

    #[test]
    fn order_change_through_mutable_borrow_resorts() {
        let mut map = map_with_orders(&[("a", 0), ("b", 1), ("c", 1)]);
        {
            let mut layer = map.get_layer_mut("a").expect("present");
            assert!(layer.set_order_num(1));
        }
        assert_eq!(names(&map), ["a", "b", "c"]);

        map.get_layer_mut("c").expect("present").set_order_num(0);
        assert_eq!(names(&map), ["c", "a", "b"]);
    }

    #[test]
    fn remove_layer_takes_first_match() {
        let mut map = map_with_orders(&[("dup", 0), ("dup", 5), ("other", 1)]);
        let removed = map.remove_layer("dup").expect("present");
        assert_eq!(removed.order_num(), 0);
        assert_eq!(names(&map), ["other", "dup"]);
        map.remove_all_layers();
        assert!(map.layers().is_empty());
    }

    #[test]
    fn dimensions_reject_non_finite() {
        let mut map = Map2D::new(f64::NAN, 10.0);
        assert_eq!(map.width(), 0.0);
        assert!(!map.set_height(f64::INFINITY));
        assert_eq!(map.height(), 10.0);
    }
}
