mod data_cache;
mod loader;
mod source_locator;

pub use data_cache::{CacheLookup, DataCache, DataEntry, LoadProgress, LoadStatus};
pub use loader::{FileImageLoader, ImageLoader, LoadError};
pub use source_locator::{validate_source_locator, SourceLocatorError};
