//! Error taxonomy of the engine.
//!
//! Four families of failure cross the engine boundary, all typed:
//!
//! - configuration errors: invalid hyperparameters, rejected up front
//!   and never retried
//! - dataset errors: the working set collapsed (or the input was bad),
//!   fatal for that training run
//! - unknown-entity errors: a query referenced an id outside the
//!   trained index, recoverable at the call site
//! - model-not-trained: a query arrived before any bundle was loaded
//!
//! Degraded-but-answerable queries (cold-start users) are *not*
//! errors; they return flagged results instead.

use dataset::DatasetError;
use models::ModelError;
use thiserror::Error;

/// Errors surfaced by training, persistence and the query facade.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A hyperparameter failed validation. Named field plus reason, so
    /// the serving layer can render a precise message.
    #[error("invalid configuration: {field}: {reason}")]
    Config { field: &'static str, reason: String },

    /// Dataset preparation failed (insufficient data, invalid input).
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// A query referenced an id that is not in the trained index.
    #[error("unknown {entity} id '{id}'")]
    UnknownEntity { entity: &'static str, id: String },

    /// A model-level index error; surfaces only on internal misuse.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The facade was queried before a bundle was installed.
    #[error("no trained model loaded")]
    ModelNotTrained,

    /// The blob is not a model bundle at all.
    #[error("model blob is not in the expected format")]
    BadBlobFormat,

    /// The blob was written by an incompatible format version.
    #[error("unsupported model blob version {found} (supported: {supported})")]
    UnsupportedBlobVersion { found: u32, supported: u32 },

    /// The blob framing was valid but the body failed to decode.
    #[error("failed to decode model blob: {0}")]
    Decode(String),

    /// The bundle failed to serialize.
    #[error("failed to encode model bundle: {0}")]
    Encode(String),
}

/// Convenience type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, EngineError>;
