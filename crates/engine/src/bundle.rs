//! The trained model bundle and its persistence format.
//!
//! Everything one training run produces travels as a single unit: the
//! entity indices, the rating matrix snapshot, aligned metadata, the
//! factor model, the content vector space and (under the full
//! strategy) both pruned neighbour structures. Loading a blob that
//! round-tripped through `save` reproduces recommendations exactly.
//!
//! The on-disk form is opaque to everything outside this crate: a
//! four-byte magic tag, a little-endian format version, then a bincode
//! body. The version gate means an old reader rejects a new blob with
//! a specific error rather than misreading it.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use dataset::{EntityIndex, MovieMeta, RatingMatrix, SparseVector};
use models::{Accuracy, FactorModel, FullSimilarity, Vocabulary};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Magic tag identifying a model blob.
pub const BUNDLE_MAGIC: [u8; 4] = *b"RECB";

/// Current blob format version.
pub const BUNDLE_VERSION: u32 = 1;

/// All trained numeric state for one model generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    /// The configuration the bundle was trained with.
    pub config: EngineConfig,
    pub users: EntityIndex,
    pub items: EntityIndex,
    /// Working-set matrix snapshot (rated-item exclusion, lite
    /// collaborative similarity, content profiles).
    pub matrix: RatingMatrix,
    /// Metadata aligned to item index order.
    pub metadata: Vec<MovieMeta>,
    pub factors: FactorModel,
    pub vocabulary: Vocabulary,
    /// One L2-normalised TF-IDF vector per item, index-aligned.
    pub content_vectors: Vec<SparseVector>,
    /// Pruned collaborative neighbours; `Some` iff the bundle was
    /// built with the full strategy.
    pub cf_neighbors: Option<FullSimilarity>,
    /// Pruned content neighbours; `Some` iff full strategy.
    pub cb_neighbors: Option<FullSimilarity>,
    /// Held-out RMSE/MAE when a holdout fraction was configured.
    pub holdout_accuracy: Option<Accuracy>,
}

impl ModelBundle {
    /// Serialize to an opaque, versioned blob.
    pub fn save(&self) -> Result<Vec<u8>> {
        let body =
            bincode::serialize(self).map_err(|err| EngineError::Encode(err.to_string()))?;

        let mut blob = Vec::with_capacity(BUNDLE_MAGIC.len() + 4 + body.len());
        blob.extend_from_slice(&BUNDLE_MAGIC);
        blob.extend_from_slice(&BUNDLE_VERSION.to_le_bytes());
        blob.extend_from_slice(&body);

        info!(bytes = blob.len(), "serialized model bundle");
        Ok(blob)
    }

    /// Deserialize a blob produced by [`ModelBundle::save`].
    pub fn load(blob: &[u8]) -> Result<Self> {
        if blob.len() < BUNDLE_MAGIC.len() + 4 || blob[..4] != BUNDLE_MAGIC {
            return Err(EngineError::BadBlobFormat);
        }

        let mut version_bytes = [0u8; 4];
        version_bytes.copy_from_slice(&blob[4..8]);
        let version = u32::from_le_bytes(version_bytes);
        if version != BUNDLE_VERSION {
            return Err(EngineError::UnsupportedBlobVersion {
                found: version,
                supported: BUNDLE_VERSION,
            });
        }

        let bundle: ModelBundle = bincode::deserialize(&blob[8..])
            .map_err(|err| EngineError::Decode(err.to_string()))?;

        info!(
            users = bundle.users.len(),
            items = bundle.items.len(),
            "loaded model bundle"
        );
        Ok(bundle)
    }
}
