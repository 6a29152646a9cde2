use std::sync::Arc;

use image::RgbaImage;

use crate::geometry::{Point2D, Rotation2D, Vector2D};

use super::active::ActiveSource;
use super::prepare::{compute_render_size, prepare_image};

/// Initial values for a [`PassiveObject2D`].
#[derive(Debug, Clone)]
pub struct PassiveObjectSettings {
    pub image: Option<Arc<RgbaImage>>,
    pub id: String,
    pub position: Point2D,
    pub rotation: Rotation2D,
    pub scale: Vector2D,
    pub size: Vector2D,
}

impl Default for PassiveObjectSettings {
    fn default() -> Self {
        Self {
            image: None,
            id: "0".to_string(),
            position: Point2D::origin(),
            rotation: Rotation2D::default(),
            scale: Vector2D::new(1.0, 1.0),
            size: Vector2D::any_size(),
        }
    }
}

/// Scene object drawn from a bitmap prepared ahead of time.
///
/// Every setter that can change the prepared bitmap re-runs
/// [`prepare_raw_image_data`](Self::prepare_raw_image_data) before returning,
/// so the render size, raster and data URL always reflect the latest write.
#[derive(Debug, Clone)]
pub struct PassiveObject2D {
    image: Option<Arc<RgbaImage>>,
    id: String,
    position: Point2D,
    rotation: Rotation2D,
    scale: Vector2D,
    size: Vector2D,
    render_width: f64,
    render_height: f64,
    raw_image: Arc<RgbaImage>,
    data_url: String,
}

impl Default for PassiveObject2D {
    fn default() -> Self {
        Self::new(PassiveObjectSettings::default())
    }
}

impl PassiveObject2D {
    pub fn new(settings: PassiveObjectSettings) -> Self {
        let mut object = Self {
            image: settings.image,
            id: settings.id,
            position: settings.position,
            rotation: settings.rotation,
            scale: settings.scale,
            size: settings.size,
            render_width: 0.0,
            render_height: 0.0,
            raw_image: Arc::new(RgbaImage::new(1, 1)),
            data_url: String::new(),
        };
        object.prepare_raw_image_data();
        object
    }

    pub fn image(&self) -> Option<&Arc<RgbaImage>> {
        self.image.as_ref()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> Point2D {
        self.position
    }

    /// Stored only; preparation and drawing ignore it.
    pub fn rotation(&self) -> Rotation2D {
        self.rotation
    }

    pub fn scale(&self) -> Vector2D {
        self.scale
    }

    pub fn size(&self) -> Vector2D {
        self.size
    }

    pub fn render_width(&self) -> f64 {
        self.render_width
    }

    pub fn render_height(&self) -> f64 {
        self.render_height
    }

    pub fn raw_image_data(&self) -> &RgbaImage {
        &self.raw_image
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn set_image(&mut self, image: Arc<RgbaImage>) {
        self.image = Some(image);
        self.prepare_raw_image_data();
    }

    pub fn clear_image(&mut self) {
        self.image = None;
        self.prepare_raw_image_data();
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
        self.prepare_raw_image_data();
    }

    pub fn set_position(&mut self, position: Point2D) {
        self.position = position;
        self.prepare_raw_image_data();
    }

    pub fn set_rotation(&mut self, rotation: Rotation2D) {
        self.rotation = rotation;
        self.prepare_raw_image_data();
    }

    pub fn set_scale(&mut self, scale: Vector2D) {
        self.scale = scale;
        self.prepare_raw_image_data();
    }

    pub fn set_size(&mut self, size: Vector2D) {
        self.size = size;
        self.prepare_raw_image_data();
    }

    /// Recomputes render size, scaled raster and PNG data URL. Returns `false`
    /// when no source image is set, leaving the cache empty.
    pub fn prepare_raw_image_data(&mut self) -> bool {
        let Some(image) = self.image.as_ref() else {
            self.render_width = 0.0;
            self.render_height = 0.0;
            self.raw_image = Arc::new(RgbaImage::new(1, 1));
            self.data_url.clear();
            return false;
        };
        let prepared = prepare_image(image, self.size, self.scale);
        self.render_width = prepared.render_width;
        self.render_height = prepared.render_height;
        self.raw_image = Arc::new(prepared.raster);
        self.data_url = prepared.data_url;
        true
    }
}

#[derive(Debug, Clone)]
pub struct ActiveObjectSettings {
    pub source: ActiveSource,
    pub id: String,
    pub position: Point2D,
    pub rotation: Rotation2D,
    pub scale: Vector2D,
    pub size: Vector2D,
}

impl Default for ActiveObjectSettings {
    fn default() -> Self {
        Self {
            source: ActiveSource::default(),
            id: "0".to_string(),
            position: Point2D::origin(),
            rotation: Rotation2D::default(),
            scale: Vector2D::new(1.0, 1.0),
            size: Vector2D::any_size(),
        }
    }
}

/// Scene object redrawn from its live source every frame.
#[derive(Debug, Clone)]
pub struct ActiveObject2D {
    source: ActiveSource,
    id: String,
    position: Point2D,
    rotation: Rotation2D,
    scale: Vector2D,
    size: Vector2D,
}

impl Default for ActiveObject2D {
    fn default() -> Self {
        Self::new(ActiveObjectSettings::default())
    }
}

impl ActiveObject2D {
    pub fn new(settings: ActiveObjectSettings) -> Self {
        Self {
            source: settings.source,
            id: settings.id,
            position: settings.position,
            rotation: settings.rotation,
            scale: settings.scale,
            size: settings.size,
        }
    }

    pub fn source(&self) -> &ActiveSource {
        &self.source
    }

    pub fn id(&self) -> &str {
        &self.id
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

    /// Derived from the live source on every call.
    pub fn render_size(&self) -> (f64, f64) {
        compute_render_size(self.size, self.scale, self.source.natural_size())
    }

    pub fn set_source(&mut self, source: ActiveSource) {
        self.source = source;
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
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

#[derive(Debug, Clone)]
pub enum SceneObject {
    Passive(PassiveObject2D),
    Active(ActiveObject2D),
}

impl SceneObject {
    pub fn id(&self) -> &str {
        match self {
            SceneObject::Passive(object) => object.id(),
            SceneObject::Active(object) => object.id(),
        }
    }

    pub fn position(&self) -> Point2D {
        match self {
            SceneObject::Passive(object) => object.position(),
            SceneObject::Active(object) => object.position(),
        }
    }

    pub fn render_size(&self) -> (f64, f64) {
        match self {
            SceneObject::Passive(object) => (object.render_width(), object.render_height()),
            SceneObject::Active(object) => object.render_size(),
        }
    }

    pub fn as_passive(&self) -> Option<&PassiveObject2D> {
        match self {
            SceneObject::Passive(object) => Some(object),
            SceneObject::Active(_) => None,
        }
    }

    pub fn as_passive_mut(&mut self) -> Option<&mut PassiveObject2D> {
        match self {
            SceneObject::Passive(object) => Some(object),
            SceneObject::Active(_) => None,
        }
    }

    pub fn as_active(&self) -> Option<&ActiveObject2D> {
        match self {
            SceneObject::Active(object) => Some(object),
            SceneObject::Passive(_) => None,
        }
    }

    pub fn as_active_mut(&mut self) -> Option<&mut ActiveObject2D> {
        match self {
            SceneObject::Active(object) => Some(object),
            SceneObject::Passive(_) => None,
        }
    }
}

impl From<PassiveObject2D> for SceneObject {
    fn from(object: PassiveObject2D) -> Self {
        SceneObject::Passive(object)
    }
}

impl From<ActiveObject2D> for SceneObject {
    fn from(object: ActiveObject2D) -> Self {
        SceneObject::Active(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_40x20() -> Arc<RgbaImage> {
        Arc::new(RgbaImage::from_pixel(40, 20, image::Rgba([10, 20, 30, 255])))
    }

    #[test]
    fn natural_size_passive_object_renders_at_source_size() {
        let object = PassiveObject2D::new(PassiveObjectSettings {
            image: Some(source_40x20()),
            id: "hero".to_string(),
            ..PassiveObjectSettings::default()
        });
        assert_eq!((object.render_width(), object.render_height()), (40.0, 20.0));
        assert_eq!(object.raw_image_data().dimensions(), (40, 20));
        assert!(object.data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn scale_setter_recomputes_cache_before_returning() {
        let mut object = PassiveObject2D::new(PassiveObjectSettings {
            image: Some(source_40x20()),
            ..PassiveObjectSettings::default()
        });
        let before = object.data_url().to_string();
        object.set_scale(Vector2D::new(2.0, 1.0));
        assert_eq!((object.render_width(), object.render_height()), (80.0, 20.0));
        assert_eq!(object.raw_image_data().dimensions(), (80, 20));
        assert_ne!(object.data_url(), before);
    }

    #[test]
    fn oversized_scale_keeps_render_size_with_placeholder_raster() {
        let object = PassiveObject2D::new(PassiveObjectSettings {
            image: Some(source_40x20()),
            scale: Vector2D::new(1e9, 1e9),
            ..PassiveObjectSettings::default()
        });
        assert_eq!((object.render_width(), object.render_height()), (4e10, 2e10));
        assert_eq!(object.raw_image_data().dimensions(), (1, 1));
    }

    #[test]
    fn size_setter_overrides_natural_size() {
        let mut object = PassiveObject2D::new(PassiveObjectSettings {
            image: Some(source_40x20()),
            ..PassiveObjectSettings::default()
        });
        object.set_size(Vector2D::new(8.0, 4.0));
        assert_eq!((object.render_width(), object.render_height()), (8.0, 4.0));
    }

    #[test]
    fn preparation_without_image_reports_failure() {
        let mut object = PassiveObject2D::default();
        assert!(!object.prepare_raw_image_data());
        assert_eq!((object.render_width(), object.render_height()), (0.0, 0.0));
        object.set_image(source_40x20());
        assert!(object.prepare_raw_image_data());
        assert!(object.prepare_raw_image_data());
        assert_eq!(object.render_width(), 40.0);

        object.clear_image();
        assert!(object.data_url().is_empty());
        assert_eq!(object.raw_image_data().dimensions(), (1, 1));
    }

    #[test]
    fn rotation_is_stored_but_not_applied() {
        let mut object = PassiveObject2D::new(PassiveObjectSettings {
            image: Some(source_40x20()),
            ..PassiveObjectSettings::default()
        });
        object.set_rotation(Rotation2D::new(90.0));
        assert_eq!(object.rotation().degrees(), 90.0);
        assert_eq!(object.raw_image_data().dimensions(), (40, 20));
    }

    #[test]
    fn active_object_render_size_follows_live_bitmap() {
        let source = ActiveSource::bitmap(RgbaImage::new(10, 5));
        let object = ActiveObject2D::new(ActiveObjectSettings {
            source: source.clone(),
            scale: Vector2D::new(3.0, 2.0),
            ..ActiveObjectSettings::default()
        });
        assert_eq!(object.render_size(), (30.0, 10.0));

        let ActiveSource::Bitmap(shared) = &source else {
            panic!("expected bitmap");
        };
        *shared.write().expect("lock") = RgbaImage::new(1, 1);
        assert_eq!(object.render_size(), (3.0, 2.0));
    }

    #[test]
    fn scene_object_dispatches_by_kind() {
        let passive: SceneObject = PassiveObject2D::new(PassiveObjectSettings {
            image: Some(source_40x20()),
            id: "p".to_string(),
            position: Point2D::new(1.0, 2.0),
            ..PassiveObjectSettings::default()
        })
        .into();
        assert_eq!(passive.id(), "p");
        assert_eq!(passive.position(), Point2D::new(1.0, 2.0));
        assert_eq!(passive.render_size(), (40.0, 20.0));
        assert!(passive.as_active().is_none());
    }
}
