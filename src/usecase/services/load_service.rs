use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entities::line_item::Dataset;
use crate::domain::error::EstimatorError;
use crate::infra::assets::BundledAsset;
use crate::infra::cache::DefaultDatasetCache;
use crate::infra::import::csv::CsvTableReader;
use crate::infra::import::xlsx::XlsxTableReader;
use crate::usecase::ports::source::{DatasetSource, FileFormat, TableReader, UploadedFile};
use crate::usecase::services::normalize::normalize;

pub struct LoadService {
    default_asset: BundledAsset,
    cache: Arc<DefaultDatasetCache>,
    readers: Vec<Arc<dyn TableReader>>,
}

impl LoadService {
    pub fn new(default_asset: BundledAsset, cache: Arc<DefaultDatasetCache>) -> Self {
        let readers: Vec<Arc<dyn TableReader>> = vec![
            Arc::new(CsvTableReader) as Arc<dyn TableReader>,
            Arc::new(XlsxTableReader) as Arc<dyn TableReader>,
        ];
        Self::with_readers(default_asset, cache, readers)
    }

    pub fn with_readers(
        default_asset: BundledAsset,
        cache: Arc<DefaultDatasetCache>,
        readers: Vec<Arc<dyn TableReader>>,
    ) -> Self {
        Self {
            default_asset,
            cache,
            readers,
        }
    }

    /// Produces a fully normalized dataset or an error; never a partial table.
    pub fn load(&self, source: &DatasetSource) -> Result<Arc<Dataset>, EstimatorError> {
        match source {
            DatasetSource::DefaultAsset => self.load_default(),
            DatasetSource::Uploaded(file) => self.load_upload(file).map(Arc::new),
        }
    }

    fn load_default(&self) -> Result<Arc<Dataset>, EstimatorError> {
        let asset = self.default_asset;
        debug!(
            key = self.cache.key(),
            cached = self.cache.is_populated(),
            "resolving default dataset"
        );
        self.cache.get_or_load(asset.id, || {
            let format = FileFormat::from_file_name(asset.id)?;
            let table = self.reader_for(asset.id, format)?.read_table(asset.id, asset.bytes)?;
            normalize(asset.id, table)
        })
    }

    fn load_upload(&self, file: &UploadedFile) -> Result<Dataset, EstimatorError> {
        let result = FileFormat::from_file_name(&file.name).and_then(|format| {
            let table = self
                .reader_for(&file.name, format)?
                .read_table(&file.name, &file.bytes)?;
            normalize(&file.name, table)
        });
        match &result {
            Ok(dataset) if dataset.is_empty() => {
                warn!(file = %file.name, "upload contains no line items")
            }
            Ok(dataset) => info!(file = %file.name, rows = dataset.len(), "loaded upload"),
            Err(err) => warn!(file = %file.name, error = %err, "rejected upload"),
        }
        result
    }

    fn reader_for(
        &self,
        file_name: &str,
        format: FileFormat,
    ) -> Result<&dyn TableReader, EstimatorError> {
        self.readers
            .iter()
            .find(|reader| reader.format() == format)
            .map(|reader| reader.as_ref())
            .ok_or_else(|| EstimatorError::UnsupportedFormat {
                file_name: file_name.to_string(),
            })
    }
}
