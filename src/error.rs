//! Error types for the styled-pdf session.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for styled-pdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while laying out or writing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Neither the requested style nor the "Normal" fallback is usable.
    #[error("Could not find the style '{0}' by name, and the style 'Normal' does not exist")]
    StyleNotFound(String),

    /// The image path does not exist or is a directory.
    #[error("Image file '{}' was not found or is not accessible", .0.display())]
    ImageNotFound(PathBuf),

    /// A symbolic position code is not two characters from `[tcb][lcr]`.
    #[error("Invalid position code '{0}': expected one of t/c/b followed by one of l/c/r")]
    InvalidPosition(String),

    /// The custom font path is missing, or a directory without any `.ttf`.
    #[error("Font file(s) '{}' cannot be accessed or do not exist", .0.display())]
    FontFileMissing(PathBuf),

    /// Font bytes could not be parsed.
    #[error("Font parsing error: {0}")]
    FontParse(String),

    /// Image bytes could not be decoded or embedded.
    #[error("Image decoding error: {0}")]
    ImageDecode(String),

    /// The existing output file could not be moved out of the way.
    #[error("Failed to move '{}' to '{}': {source}", .from.display(), .to.display())]
    FileMove {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Session configuration could not be parsed or serialised.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Error while producing PDF bytes.
    #[error("Render error: {0}")]
    Render(String),
}
