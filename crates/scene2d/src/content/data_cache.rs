use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use image::RgbaImage;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::scene::Key;

use super::loader::{FileImageLoader, ImageLoader, LoadError};

/// One `{ "id": ..., "src": ... }` item of a data list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataEntry {
    pub id: String,
    pub src: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Success,
    Error,
}

/// Reported to the per-item callback once per finished load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadProgress {
    pub id: String,
    /// 1-based completion ordinal within the batch.
    pub index: usize,
    pub total_expected: usize,
    pub status: LoadStatus,
}

#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub data: Arc<RgbaImage>,
    /// `None` when the key was not a string.
    pub id: Option<String>,
    pub valid: bool,
}

type ItemCallback = Box<dyn FnMut(&LoadProgress)>;
type DoneCallback = Box<dyn FnOnce()>;

struct LoadOutcome {
    id: String,
    src: String,
    result: Result<RgbaImage, LoadError>,
}

struct LoadBatch {
    receiver: Receiver<LoadOutcome>,
    expected: usize,
    completed: usize,
    on_item: ItemCallback,
    on_done: Option<DoneCallback>,
}

impl LoadBatch {
    fn is_finished(&self) -> bool {
        self.completed >= self.expected
    }
}

/// Image store keyed by id, filled by background loads.
///
/// Loads run on worker threads; their results are applied on the owning
/// thread by [`poll_loads`](DataCache::poll_loads) or
/// [`wait_for_loads`](DataCache::wait_for_loads), which also run the batch
/// callbacks.
pub struct DataCache {
    storage: HashMap<String, Arc<RgbaImage>>,
    loader: Arc<dyn ImageLoader>,
    batches: Vec<LoadBatch>,
    placeholder: Arc<RgbaImage>,
}

impl Default for DataCache {
    fn default() -> Self {
        Self::new(Arc::new(FileImageLoader::default()))
    }
}

impl fmt::Debug for DataCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataCache")
            .field("len", &self.storage.len())
            .field("pending_batches", &self.batches.len())
            .finish()
    }
}

impl DataCache {
    pub fn new(loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            storage: HashMap::new(),
            loader,
            batches: Vec::new(),
            placeholder: Arc::new(RgbaImage::new(0, 0)),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Whether any batch still has loads or callbacks outstanding.
    pub fn is_loading(&self) -> bool {
        !self.batches.is_empty()
    }

    pub fn get_object<'k>(&self, id: impl Into<Key<'k>>) -> CacheLookup {
        match id.into() {
            Key::Str(id) => match self.storage.get(id) {
                Some(data) => CacheLookup {
                    data: Arc::clone(data),
                    id: Some(id.to_string()),
                    valid: true,
                },
                None => CacheLookup {
                    data: Arc::clone(&self.placeholder),
                    id: Some(id.to_string()),
                    valid: false,
                },
            },
            Key::Other { .. } => CacheLookup {
                data: Arc::clone(&self.placeholder),
                id: None,
                valid: false,
            },
        }
    }

    /// Stores an already decoded image, replacing any previous entry.
    pub fn insert(&mut self, id: impl Into<String>, image: RgbaImage) {
        self.storage.insert(id.into(), Arc::new(image));
    }

    /// Empties the store and returns how many entries were dropped. Loads
    /// still in flight will repopulate their ids when they finish.
    pub fn release_objects(&mut self) -> usize {
        let released = self.storage.len();
        self.storage.clear();
        released
    }

    /// Starts loading every well-formed `{id, src}` object in `list`.
    ///
    /// Returns `false`, without side effects, when `list` is not a JSON array.
    /// Entries that are not objects with string `id` and `src` are skipped and
    /// do not count towards the expected total.
    pub fn load_data_list<F, D>(&mut self, list: &Value, on_item: F, on_done: D) -> bool
    where
        F: FnMut(&LoadProgress) + 'static,
        D: FnOnce() + 'static,
    {
        let Value::Array(items) = list else {
            return false;
        };
        let entries: Vec<DataEntry> = items
            .iter()
            .enumerate()
            .filter_map(|(position, item)| match DataEntry::deserialize(item) {
                Ok(entry) => Some(entry),
                Err(error) => {
                    warn!(position, error = %error, "data_cache_entry_skipped");
                    None
                }
            })
            .collect();
        self.load_entries(entries, on_item, on_done);
        true
    }

    pub fn load_entries<F, D>(&mut self, entries: Vec<DataEntry>, on_item: F, on_done: D)
    where
        F: FnMut(&LoadProgress) + 'static,
        D: FnOnce() + 'static,
    {
        let (sender, receiver) = channel();
        let expected = entries.len();
        for entry in entries {
            info!(id = entry.id.as_str(), src = entry.src.as_str(), "data_cache_load_started");
            let sender = sender.clone();
            let loader = Arc::clone(&self.loader);
            thread::spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| loader.load(&entry.src)))
                    .unwrap_or(Err(LoadError::LoaderPanicked));
                let _ = sender.send(LoadOutcome {
                    id: entry.id,
                    src: entry.src,
                    result,
                });
            });
        }
        self.batches.push(LoadBatch {
            receiver,
            expected,
            completed: 0,
            on_item: Box::new(on_item),
            on_done: Some(Box::new(on_done)),
        });
    }

    /// Applies every finished load without blocking. Returns the number of
    /// loads applied.
    pub fn poll_loads(&mut self) -> usize {
        let mut applied = 0;
        let mut batches = std::mem::take(&mut self.batches);
        for batch in &mut batches {
            while !batch.is_finished() {
                match batch.receiver.try_recv() {
                    Ok(outcome) => {
                        self.apply_outcome(batch, outcome);
                        applied += 1;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        abandon_batch(batch);
                        break;
                    }
                }
            }
        }
        self.finish_batches(batches);
        applied
    }

    /// Blocks until every batch has finished or `timeout` elapses. Returns
    /// `true` when nothing is left loading.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut batches = std::mem::take(&mut self.batches);
        for batch in &mut batches {
            while !batch.is_finished() {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match batch.receiver.recv_timeout(remaining) {
                    Ok(outcome) => self.apply_outcome(batch, outcome),
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => {
                        abandon_batch(batch);
                        break;
                    }
                }
            }
        }
        self.finish_batches(batches);
        self.batches.is_empty()
    }

    fn apply_outcome(&mut self, batch: &mut LoadBatch, outcome: LoadOutcome) {
        batch.completed += 1;
        let status = match outcome.result {
            Ok(image) => {
                debug!(
                    id = outcome.id.as_str(),
                    src = outcome.src.as_str(),
                    width = image.width(),
                    height = image.height(),
                    "data_cache_load_succeeded"
                );
                self.storage.insert(outcome.id.clone(), Arc::new(image));
                LoadStatus::Success
            }
            Err(load_error) => {
                error!(
                    id = outcome.id.as_str(),
                    src = outcome.src.as_str(),
                    error = %load_error,
                    "data_cache_load_failed"
                );
                self.storage
                    .insert(outcome.id.clone(), Arc::clone(&self.placeholder));
                LoadStatus::Error
            }
        };
        let progress = LoadProgress {
            id: outcome.id,
            index: batch.completed,
            total_expected: batch.expected,
            status,
        };
        (batch.on_item)(&progress);
    }

    /// Fires `on_done` for finished batches and keeps the rest. Batches
    /// started from inside a callback land in `self.batches` meanwhile.
    fn finish_batches(&mut self, batches: Vec<LoadBatch>) {
        let mut still_loading = Vec::with_capacity(batches.len());
        for mut batch in batches {
            if batch.is_finished() {
                if let Some(on_done) = batch.on_done.take() {
                    debug!(loaded = batch.completed, "data_cache_batch_finished");
                    on_done();
                }
            } else {
                still_loading.push(batch);
            }
        }
        still_loading.append(&mut self.batches);
        self.batches = still_loading;
    }
}

/// All senders are gone with results missing; the batch can never finish.
fn abandon_batch(batch: &mut LoadBatch) {
    warn!(
        expected = batch.expected,
        completed = batch.completed,
        "data_cache_batch_abandoned"
    );
    batch.on_done = None;
    batch.expected = batch.completed;
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    const WAIT: Duration = Duration::from_secs(10);

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 255, 255]))
            .save(dir.join(name))
            .expect("write png");
    }

    fn cache_for(dir: &Path) -> DataCache {
        DataCache::new(Arc::new(FileImageLoader::new(dir)))
    }

    struct Recorded {
        progress: Rc<RefCell<Vec<LoadProgress>>>,
        done: Rc<RefCell<u32>>,
    }

    impl Recorded {
        fn new() -> Self {
            Self {
                progress: Rc::new(RefCell::new(Vec::new())),
                done: Rc::new(RefCell::new(0)),
            }
        }

        fn on_item(&self) -> impl FnMut(&LoadProgress) + 'static {
            let progress = Rc::clone(&self.progress);
            move |item| progress.borrow_mut().push(item.clone())
        }

        fn on_done(&self) -> impl FnOnce() + 'static {
            let done = Rc::clone(&self.done);
            move || *done.borrow_mut() += 1
        }
    }

    #[test]
    fn non_array_list_is_rejected() {
        let mut cache = DataCache::default();
        let recorded = Recorded::new();
        assert!(!cache.load_data_list(&json!({"id": "a"}), recorded.on_item(), recorded.on_done()));
        assert!(!cache.is_loading());
    }

    #[test]
    fn malformed_entries_are_excluded_from_total() {
        let temp = TempDir::new().expect("temp dir");
        write_png(temp.path(), "a.png", 4, 4);
        write_png(temp.path(), "b.png", 2, 3);
        let mut cache = cache_for(temp.path());
        let recorded = Recorded::new();
        let list = json!([
            {"id": "a", "src": "a.png"},
            {"id": "b", "src": "b.png"},
            {"id": "c"},
            {"nope": 1},
        ]);

        assert!(cache.load_data_list(&list, recorded.on_item(), recorded.on_done()));
        assert!(cache.wait_for_loads(WAIT));

        let progress = recorded.progress.borrow();
        assert_eq!(progress.len(), 2);
        assert!(progress.iter().all(|item| item.total_expected == 2));
        assert!(progress.iter().all(|item| item.status == LoadStatus::Success));
        let indices: Vec<usize> = progress.iter().map(|item| item.index).collect();
        assert_eq!(indices, [1, 2]);
        assert_eq!(*recorded.done.borrow(), 1);

        let b = cache.get_object("b");
        assert!(b.valid);
        assert_eq!(b.data.dimensions(), (2, 3));
        assert_eq!(cache.len(), 2);

        let c = cache.get_object("c");
        assert!(!c.valid);
        assert_eq!(c.data.dimensions(), (0, 0));
    }

    #[test]
    fn failed_load_stores_placeholder_and_reports_error() {
        let temp = TempDir::new().expect("temp dir");
        let mut cache = cache_for(temp.path());
        let recorded = Recorded::new();
        cache.load_entries(
            vec![DataEntry {
                id: "ghost".to_string(),
                src: "missing.png".to_string(),
            }],
            recorded.on_item(),
            recorded.on_done(),
        );
        assert!(cache.wait_for_loads(WAIT));

        let progress = recorded.progress.borrow();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].status, LoadStatus::Error);
        assert_eq!(progress[0].id, "ghost");
        assert_eq!(*recorded.done.borrow(), 1);

        let lookup = cache.get_object("ghost");
        assert!(lookup.valid);
        assert_eq!(lookup.data.dimensions(), (0, 0));
    }

    #[test]
    fn empty_batch_completes_on_next_poll() {
        let mut cache = DataCache::default();
        let recorded = Recorded::new();
        assert!(cache.load_data_list(&json!([1, "x"]), recorded.on_item(), recorded.on_done()));
        assert_eq!(*recorded.done.borrow(), 0);
        assert_eq!(cache.poll_loads(), 0);
        assert_eq!(*recorded.done.borrow(), 1);
        cache.poll_loads();
        assert_eq!(*recorded.done.borrow(), 1);
        assert!(!cache.is_loading());
    }

    #[test]
    fn lookups_for_unknown_or_non_string_ids_are_invalid() {
        let mut cache = DataCache::default();
        cache.insert("known", RgbaImage::new(1, 1));

        let unknown = cache.get_object("other");
        assert!(!unknown.valid);
        assert_eq!(unknown.id.as_deref(), Some("other"));

        let numeric = cache.get_object(7_i64);
        assert!(!numeric.valid);
        assert_eq!(numeric.id, None);
        assert_eq!(numeric.data.dimensions(), (0, 0));

        assert!(cache.get_object("known").valid);
    }

    #[test]
    fn release_objects_returns_count_and_clears() {
        let mut cache = DataCache::default();
        cache.insert("a", RgbaImage::new(1, 1));
        cache.insert("b", RgbaImage::new(1, 1));
        assert_eq!(cache.release_objects(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.release_objects(), 0);
    }

    struct PanickingLoader;

    impl ImageLoader for PanickingLoader {
        fn load(&self, _src: &str) -> Result<RgbaImage, LoadError> {
            panic!("loader exploded");
        }
    }

    #[test]
    fn panicking_loader_is_reported_as_error() {
        let mut cache = DataCache::new(Arc::new(PanickingLoader));
        let recorded = Recorded::new();
        cache.load_entries(
            vec![DataEntry {
                id: "x".to_string(),
                src: "x.png".to_string(),
            }],
            recorded.on_item(),
            recorded.on_done(),
        );
        assert!(cache.wait_for_loads(WAIT));
        assert_eq!(recorded.progress.borrow()[0].status, LoadStatus::Error);
        assert_eq!(*recorded.done.borrow(), 1);
    }
}
