//! Error types for the LibVLC loader
//!
//! Every failure here is fatal to the calling operation. The enum is `Clone`
//! so a terminal load failure can be handed back to every later caller
//! without attempting the load again.

use std::path::PathBuf;
use thiserror::Error;

use crate::library::LibraryKind;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Loader error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Expected library file not found at the resolved path
    #[error("Cannot find {library} at {}", .path.display())]
    MissingLibraryFile {
        library: LibraryKind,
        path: PathBuf,
    },

    /// The OS refused to load a library that was located (bad format,
    /// wrong architecture, missing transitive dependency)
    #[error(
        "Failed to load required native library {library} from {}: {reason}. \
         Have you installed the LibVLC package for your target platform?",
        .path.display()
    )]
    LoadFailure {
        library: LibraryKind,
        path: PathBuf,
        reason: String,
    },

    /// Major version of the native library differs from the binding's own
    #[error(
        "Version mismatch between LibVLC {native} and vlcrt {binding}. \
         They must share the same major version number"
    )]
    VersionMismatch { native: u32, binding: u32 },

    /// A required export is missing from a loaded library
    #[error("Symbol {symbol} not found: {reason}")]
    SymbolNotFound { symbol: String, reason: String },

    /// No dynamic-loading backend exists for the host
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The process-wide loader was installed more than once
    #[error("Global loader already initialized")]
    AlreadyInitialized,
}

impl Error {
    /// Library this error refers to, if any
    pub fn library(&self) -> Option<LibraryKind> {
        match self {
            Self::MissingLibraryFile { library, .. } | Self::LoadFailure { library, .. } => {
                Some(*library)
            }
            _ => None,
        }
    }
}
