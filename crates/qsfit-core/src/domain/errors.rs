pub type OracleResult<T> = Result<T, OracleError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("unknown qubit model kind '{kind}', registered kinds: [{registered}]")]
    UnknownModelKind { kind: String, registered: String },
    #[error("sweep data extraction failed: {reason}")]
    DataExtraction { reason: String },
    #[error("no candidate peaks extracted from sweep data")]
    InsufficientPeaks,
    #[error("invalid sweep dataset: {reason}")]
    InvalidDataset { reason: String },
    #[error("invalid grid axis '{axis}': {reason}")]
    InvalidGrid {
        axis: &'static str,
        reason: String,
    },
}

impl OracleError {
    pub fn unknown_model_kind(kind: impl Into<String>, registered: &[&str]) -> Self {
        Self::UnknownModelKind {
            kind: kind.into(),
            registered: registered.join(", "),
        }
    }

    pub fn data_extraction(reason: impl Into<String>) -> Self {
        Self::DataExtraction {
            reason: reason.into(),
        }
    }

    pub fn invalid_dataset(reason: impl Into<String>) -> Self {
        Self::InvalidDataset {
            reason: reason.into(),
        }
    }

    pub fn invalid_grid(axis: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidGrid {
            axis,
            reason: reason.into(),
        }
    }

    pub const fn is_fatal(&self) -> bool {
        true
    }
}
