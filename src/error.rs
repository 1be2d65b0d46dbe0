use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while managing a chromosome and its experiments.
#[derive(Error, Debug)]
pub enum Error {
    #[error("experiment {0} not found")]
    ExperimentNotFound(String),

    #[error("alignment {0} not found")]
    AlignmentNotFound(String),

    #[error("resolution is needed to attach experiment {0}")]
    MissingResolution(String),

    #[error("no Hi-C data for experiment {0}")]
    NoData(String),

    #[error("TAD borders not found for experiment {0}")]
    TadBordersNotFound(String),

    #[error("parse error in {path:?} at line {line}: {msg}")]
    Parse {
        path: PathBuf,
        line: usize,
        msg: String,
    },

    #[error("malformed contact matrix in {path:?}: {msg}")]
    MatrixShape { path: PathBuf, msg: String },

    #[error("I/O error: {source} ({path:?})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
