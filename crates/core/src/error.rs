use std::path::{Path, PathBuf};

use scriptproof_search::SubstitutionError;
use thiserror::Error;

use crate::document::DocumentError;

/// Failure conditions surfaced by the proofing stages.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
    #[error("log {} is missing or has no entries", path.display())]
    EmptyLog { path: PathBuf },
    #[error("findings log has {findings} entries but corrected log has {corrected}")]
    CountMismatch { findings: usize, corrected: usize },
    #[error("correction #{ordinal} is blank")]
    EmptyCorrection { ordinal: usize },
    #[error("corrector failed: {0}")]
    Corrector(String),
    #[error(transparent)]
    Substitution(#[from] SubstitutionError),
}

impl ProofError {
    pub(crate) fn read(path: &Path, source: DocumentError) -> Self {
        if source.is_not_found() {
            ProofError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ProofError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub(crate) fn write(path: &Path, source: impl Into<DocumentError>) -> Self {
        ProofError::Write {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}
