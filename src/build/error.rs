use crate::transform::TransformError;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Why a single task failed. Never aborts other tasks by itself.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("cannot read timestamp of `{path}`")]
    StaleCheck {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown transform `{0}`")]
    UnknownTransform(String),

    #[error("transform `{id}` failed")]
    Transform {
        id: String,
        #[source]
        source: TransformError,
    },

    #[error("cannot write `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TaskError {
    /// The error and all of its causes on one line, `a: b: c`.
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
