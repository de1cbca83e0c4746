use std::{collections::TryReserveError, fmt, io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to allocate memory: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("Cannot open directory {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{op} failed for {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error("Formatting error")]
    Formatting(#[from] fmt::Error),

    #[error("Failed to change directory to {}: {source}", path.display())]
    StartDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create data folder at {}: {source}", path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AppError {
    /// Fatal errors end the session; everything else is shown in an overlay or ignored.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Allocation(_)
                | Self::Terminal(_)
                | Self::Formatting(_)
                | Self::StartDir { .. }
                | Self::DataDir { .. }
        )
    }

    /// Short message for the error overlay.
    pub fn user_message(&self) -> String {
        match self {
            Self::Access { source, .. } if source.kind() == io::ErrorKind::PermissionDenied => {
                "Permission denied".to_owned()
            }
            Self::Io { op, source, .. } if source.kind() == io::ErrorKind::PermissionDenied => {
                format!("{}: permission denied", op)
            }
            other => other.to_string(),
        }
    }
}
