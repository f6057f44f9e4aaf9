//! Crate-wide error type.

use thiserror::Error;

/// Errors produced while loading, cleaning, or encoding the dataset.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// A record's `terms` column is not a well-formed list literal.
    #[error("malformed label list for {title:?}: {reason}")]
    Parse { title: String, reason: String },

    /// A category was seen at encode time that is absent from the
    /// training-built vocabulary, under the `error` OOV policy.
    #[error("unknown category at encode time: {0:?}")]
    UnknownCategory(String),

    #[error("dataset is empty after cleaning")]
    EmptyDataset,
}
