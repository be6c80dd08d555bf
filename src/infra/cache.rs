use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::entities::line_item::Dataset;
use crate::domain::error::EstimatorError;

/// Process-lifetime memo of the bundled dataset. Populated on first use and
/// read-only afterwards, so clones of the owning `Arc` can be shared freely.
#[derive(Debug)]
pub struct DefaultDatasetCache {
    key: &'static str,
    cell: OnceCell<Arc<Dataset>>,
}

impl DefaultDatasetCache {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            cell: OnceCell::new(),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn is_populated(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Returns the cached dataset for `key`, running `load` at most once on success.
    /// A failed load leaves the cache empty.
    pub fn get_or_load<F>(&self, key: &str, load: F) -> Result<Arc<Dataset>, EstimatorError>
    where
        F: FnOnce() -> Result<Dataset, EstimatorError>,
    {
        if key != self.key {
            return load().map(Arc::new);
        }
        if let Some(dataset) = self.cell.get() {
            debug!(key, "default dataset cache hit");
            return Ok(dataset.clone());
        }
        self.cell
            .get_or_try_init(|| {
                info!(key, "loading default dataset");
                load().map(Arc::new)
            })
            .cloned()
    }
}
