use super::background::Background2D;
use super::key::{Key, SceneError};
use super::object::SceneObject;

pub const UNSORTED_ORDER: i32 = -1;

#[derive(Debug, Clone)]
pub struct Layer2D {
    name: String,
    order_num: i32,
    background: Background2D,
    objects: Vec<SceneObject>,
}

impl Default for Layer2D {
    fn default() -> Self {
        Self {
            name: "layer".to_string(),
            order_num: UNSORTED_ORDER,
            background: Background2D::default(),
            objects: Vec::new(),
        }
    }
}

impl Layer2D {
    /// An order number other than `>= 0` or `-1` leaves the layer unsorted.
    pub fn new(name: impl Into<String>, order_num: i32) -> Self {
        let mut layer = Self {
            name: name.into(),
            ..Self::default()
        };
        layer.set_order_num(order_num);
        layer
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order_num(&self) -> i32 {
        self.order_num
    }

    pub fn background(&self) -> &Background2D {
        &self.background
    }

    pub fn background_mut(&mut self) -> &mut Background2D {
        &mut self.background
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_order_num(&mut self, order_num: i32) -> bool {
        if order_num < 0 && order_num != UNSORTED_ORDER {
            return false;
        }
        self.order_num = order_num;
        true
    }

    pub fn set_background(&mut self, background: Background2D) {
        self.background = background;
    }

    /// Appends and returns the object's id. Ids are not checked for uniqueness.
    pub fn add_object(&mut self, object: impl Into<SceneObject>) -> String {
        let object = object.into();
        let id = object.id().to_string();
        self.objects.push(object);
        id
    }

    pub fn get_object<'k>(&self, id: impl Into<Key<'k>>) -> Result<&SceneObject, SceneError> {
        let index = self.position_of(id.into())?;
        Ok(&self.objects[index])
    }

    pub fn get_object_mut<'k>(
        &mut self,
        id: impl Into<Key<'k>>,
    ) -> Result<&mut SceneObject, SceneError> {
        let index = self.position_of(id.into())?;
        Ok(&mut self.objects[index])
    }

    pub fn remove_object<'k>(&mut self, id: impl Into<Key<'k>>) -> Result<SceneObject, SceneError> {
        let index = self.position_of(id.into())?;
        Ok(self.objects.remove(index))
    }

    pub fn remove_all_objects(&mut self) {
        self.objects.clear();
    }

    /// Insertion order, which is also draw order.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn position_of(&self, key: Key<'_>) -> Result<usize, SceneError> {
        let id = key.require_str("id")?;
        self.objects
            .iter()
            .position(|object| object.id() == id)
            .ok_or_else(|| SceneError::ObjectNotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::object::{PassiveObject2D, PassiveObjectSettings};

    fn passive(id: &str) -> PassiveObject2D {
        PassiveObject2D::new(PassiveObjectSettings {
            id: id.to_string(),
            ..PassiveObjectSettings::default()
        })
    }

    #[test]
    fn order_num_accepts_non_negative_or_unsorted() {
        let mut layer = Layer2D::new("ground", 3);
        assert_eq!(layer.order_num(), 3);
        assert!(!layer.set_order_num(-2));
        assert_eq!(layer.order_num(), 3);
        assert!(layer.set_order_num(UNSORTED_ORDER));
        assert_eq!(layer.order_num(), -1);
        assert_eq!(Layer2D::new("x", -7).order_num(), UNSORTED_ORDER);
    }

    #[test]
    fn objects_keep_insertion_order_and_first_match_wins() {
        let mut layer = Layer2D::default();
        assert_eq!(layer.add_object(passive("a")), "a");
        layer.add_object(passive("b"));
        layer.add_object(passive("a"));
        let ids: Vec<&str> = layer.objects().iter().map(SceneObject::id).collect();
        assert_eq!(ids, ["a", "b", "a"]);

        let removed = layer.remove_object("a").expect("present");
        assert_eq!(removed.id(), "a");
        let ids: Vec<&str> = layer.objects().iter().map(SceneObject::id).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn missing_and_mistyped_ids_fail() {
        let mut layer = Layer2D::default();
        layer.add_object(passive("a"));
        assert_eq!(
            layer.get_object("zzz").map(SceneObject::id),
            Err(SceneError::ObjectNotFound {
                id: "zzz".to_string()
            })
        );
        assert!(matches!(
            layer.remove_object(true),
            Err(SceneError::ArgumentType { argument: "id", .. })
        ));
        assert_eq!(layer.objects().len(), 1);
    }

    #[test]
    fn get_object_mut_edits_in_place() {
        let mut layer = Layer2D::default();
        layer.add_object(passive("a"));
        layer
            .get_object_mut("a")
            .expect("present")
            .as_passive_mut()
            .expect("passive")
            .set_id("renamed");
        assert!(layer.get_object("renamed").is_ok());
        layer.remove_all_objects();
        assert!(layer.objects().is_empty());
    }
}
