/*!
 * Error types for the sdlxliff library.
 *
 * This module contains custom error types for loading, patching and writing
 * SDLXLIFF documents, using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

use crate::document::NodeAddress;

/// Result alias used throughout the library
pub type XliffResult<T> = std::result::Result<T, XliffError>;

/// Errors that can occur while loading or writing a bilingual document
#[derive(Error, Debug)]
pub enum XliffError {
    /// The input could not be parsed as XML
    #[error("XML is not well-formed in {origin}: {message}")]
    NotWellFormed {
        /// File path, or a description of the parsed fragment
        origin: String,
        /// Parser message, including the byte position when known
        message: String,
    },

    /// No `file` element declares both source and target languages
    #[error("No file declaration with source-language and target-language in {0}")]
    MissingDeclaration(String),

    /// A write-back address does not resolve to any element of the tree
    #[error("No element found for {0}")]
    NodeNotFound(NodeAddress),

    /// The in-memory model does not correspond to the document structure
    #[error("Structural mismatch at {address}: {reason}")]
    StructuralMismatch {
        /// Address of the offending fragment
        address: NodeAddress,
        /// What did not line up
        reason: String,
    },

    /// One or more fragments could not be resolved; nothing was written
    #[error("{} segment(s) could not be written: {}", .0.len(), join_errors(.0))]
    WriteFailed(Vec<XliffError>),

    /// Reading or writing the file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl XliffError {
    /// Build a not-well-formed error for the given origin
    pub fn not_well_formed(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotWellFormed {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Errors collected in a failed write, or the error itself
    pub fn failures(&self) -> Vec<&XliffError> {
        match self {
            Self::WriteFailed(errors) => errors.iter().collect(),
            other => vec![other],
        }
    }
}

/// Ways an edited segment can disagree with the inline codes it was exported with
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InlineCodeError {
    #[error("inline code {0} is missing")]
    Missing(String),

    #[error("inline code {0} appears more than once")]
    Repeated(String),

    #[error("inline code {0} does not exist in this segment")]
    Unknown(String),

    #[error("inline code {0} closes out of order")]
    Misnested(String),
}

fn join_errors(errors: &[XliffError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the document layer
    #[error("Document error: {0}")]
    Document(#[from] XliffError),

    /// Error reading or writing a translation sheet
    #[error("Sheet error: {0}")]
    Sheet(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Sheet(error.to_string())
    }
}
