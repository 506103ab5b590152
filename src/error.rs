//! Error types for import, export, and persistence
//!
//! Errors are classified by how the UI should react:
//! - Format: the chosen file is not a contact document; nothing was applied
//! - Io: the platform could not read or write; the user may retry or pick
//!   another location
//! - Busy: another import is still waiting for a decision

use std::path::PathBuf;
use thiserror::Error;

pub use crate::store::StoreError;

/// Fatal problems with an import document. Raised before any store mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("not parseable: {0}")]
    NotParseable(String),

    #[error("missing contacts list")]
    MissingContactsList,

    #[error("no valid contacts")]
    NoValidContacts,
}

/// Failures at the file / persistence boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No file selected")]
    NoFileSelected,

    #[error("Saved data at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,
}

/// Everything that can stop an import as a whole.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Import failed: {0}")]
    Format(#[from] FormatError),

    #[error("Import failed: {0}")]
    Io(#[from] GatewayError),

    #[error("Another import is already in progress")]
    InProgress,
}

/// Failure of a single store edit made through `AppState`.
///
/// `Persist` means the edit could not be saved and was rolled back.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to save contacts: {0}")]
    Persist(#[from] GatewayError),
}

impl ImportError {
    /// Returns true if trying again (possibly with another file) can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ImportError::Io(_) | ImportError::InProgress)
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ImportError::Format(FormatError::NotParseable(_)) => {
                "Choose a JSON file exported from the contact book."
            }
            ImportError::Format(FormatError::MissingContactsList) => {
                "The file must contain a \"contacts\" list."
            }
            ImportError::Format(FormatError::NoValidContacts) => {
                "Every entry needs a name and a tags list."
            }
            ImportError::Io(GatewayError::NoFileSelected) => "Pick a file to import.",
            ImportError::Io(_) => "Check file permissions or try another location.",
            ImportError::InProgress => "Finish the current import first.",
        }
    }
}

/// Serializable error representation for the UI layer
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFacingError {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Format,
    Io,
    Busy,
}

impl From<&ImportError> for UserFacingError {
    fn from(err: &ImportError) -> Self {
        let error_type = match err {
            ImportError::Format(_) => ErrorType::Format,
            ImportError::Io(_) => ErrorType::Io,
            ImportError::InProgress => ErrorType::Busy,
        };

        UserFacingError {
            message: err.to_string(),
            error_type,
            can_retry: err.is_retryable(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}

impl From<&GatewayError> for UserFacingError {
    fn from(err: &GatewayError) -> Self {
        UserFacingError {
            message: err.to_string(),
            error_type: ErrorType::Io,
            can_retry: true,
            recovery_suggestion: "Check file permissions or try another location.".to_string(),
        }
    }
}
