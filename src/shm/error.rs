//! Error types for the shared-memory transport.
//!
//! [`TransportError`] covers region creation and attachment failures.
//! They are fatal at engine startup; a reader may observe
//! [`TransportError::RegionGone`] mid-run and re-open.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while creating, opening, or mapping a shared
/// region.
#[derive(Debug)]
#[non_exhaustive]
pub enum TransportError {
    /// An I/O error occurred while creating, opening, or mapping a
    /// region file.
    Io {
        /// The underlying I/O error message.
        message: String,
        /// The region file involved, if known.
        path: Option<PathBuf>,
    },

    /// An existing region file does not have the expected layout size.
    ///
    /// Attaching to it would reinterpret foreign memory, so the open is
    /// refused.
    SizeMismatch {
        /// The region file that was probed.
        path: PathBuf,
        /// Size required by the region's layout type, bytes.
        expected: u64,
        /// Actual file size, bytes.
        actual: u64,
    },

    /// A region that a reader depends on has been unlinked.
    RegionGone {
        /// The well-known region name.
        name: String,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Io { message, path } => {
                if let Some(p) = path {
                    write!(f, "shared memory I/O error at {}: {message}", p.display())
                } else {
                    write!(f, "shared memory I/O error: {message}")
                }
            }
            TransportError::SizeMismatch {
                path,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "shared region {} has size {actual} but the layout requires {expected}",
                    path.display()
                )
            }
            TransportError::RegionGone { name } => {
                write!(f, "shared region {name} has disappeared")
            }
        }
    }
}

impl std::error::Error for TransportError {}

impl From<std::io::Error> for TransportError {
    #[cold]
    fn from(err: std::io::Error) -> Self {
        TransportError::Io {
            message: err.to_string(),
            path: None,
        }
    }
}
