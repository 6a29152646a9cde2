mod active;
mod background;
mod grid;
mod key;
mod layer;
mod map;
mod object;
pub(crate) mod prepare;

pub use active::{ActiveSource, ActiveSourceError, RasterRegion};
pub use background::{Background2D, BackgroundData};
pub use grid::{Grid2D, GridSettings};
pub use key::{Key, SceneError};
pub use layer::{Layer2D, UNSORTED_ORDER};
pub use map::{LayerMut, Map2D};
pub use object::{
    ActiveObject2D, ActiveObjectSettings, PassiveObject2D, PassiveObjectSettings, SceneObject,
};
pub use prepare::{compute_render_size, encode_png_data_url, DATA_URL_PNG_PREFIX};
