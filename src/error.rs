//! Error types of the clustering engine and its loaders.

use thiserror::Error;

use crate::types::Dimension;

/// Errors that can occur while loading points or computing a clustering.
#[derive(Debug, Error)]
pub enum KMeansError {
    /// k, max_iter, the number of points or the point data violate a precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two compared vectors differ in length.
    #[error("dimension mismatch: left point has {left} coordinates, right point has {right}")]
    DimensionMismatch { left: Dimension, right: Dimension },

    /// I/O error while reading an input table or writing an output file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An input line could not be parsed.
    #[error("cannot parse '{path}' at line {line}: {reason}")]
    Parse {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("cannot build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, KMeansError>;
