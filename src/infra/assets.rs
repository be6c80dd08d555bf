/// Identifier of the dataset shipped with the binary; also its cache key.
pub const DEFAULT_DATASET_ID: &str = "mechanical_estimator_dataset.csv";

const DEFAULT_DATASET_BYTES: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/mechanical_estimator_dataset.csv"
));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundledAsset {
    pub id: &'static str,
    pub bytes: &'static [u8],
}

impl BundledAsset {
    pub fn default_dataset() -> Self {
        Self {
            id: DEFAULT_DATASET_ID,
            bytes: DEFAULT_DATASET_BYTES,
        }
    }
}
