//! Error types for oxtract operations.
//!
//! One error type covers the whole pipeline: classification, backend tool
//! invocation, target naming, and downloads. Permission problems have no
//! variant here: they are reported as warnings, never as errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::format::Format;

/// The main error type for oxtract operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the local filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file's name and signature match no supported format.
    #[error("could not recognize the format of {}", path.display())]
    UnknownFormat {
        /// The unclassifiable file.
        path: PathBuf,
    },

    /// The external tool needed for this format is not installed.
    #[error("cannot handle {format} archives: `{tool}` is not installed")]
    MissingDependency {
        /// Format that needed the tool.
        format: Format,
        /// Name of the missing binary.
        tool: String,
    },

    /// The external tool ran but reported failure.
    #[error("`{tool}` failed{}{}", match code {
        Some(c) => format!(" with exit code {c}"),
        None => " (killed by signal)".to_string(),
    }, if stderr.is_empty() { String::new() } else { format!(": {stderr}") })]
    ExtractionFailed {
        /// Name of the failing binary.
        tool: String,
        /// Exit code, if the process exited normally.
        code: Option<i32>,
        /// Bounded tail of the tool's stderr.
        stderr: String,
    },

    /// The archive is damaged or truncated.
    #[error("{} appears to be corrupt: {detail}", path.display())]
    Corrupt {
        /// The damaged archive.
        path: PathBuf,
        /// What the backend reported.
        detail: String,
    },

    /// An archive entry would escape the destination directory.
    #[error("refusing to extract unsafe entry path: {entry}")]
    UnsafeEntry {
        /// The offending entry path as listed.
        entry: String,
    },

    /// The format has no listing mechanism.
    #[error("{format} archives cannot be listed without extracting them")]
    ListingUnsupported {
        /// Format lacking a listing mechanism.
        format: Format,
    },

    /// Every candidate target name up to the ceiling was taken.
    #[error("could not find a free name for `{base}` (tried {ceiling} suffixes)")]
    NameExhausted {
        /// The base name that could not be placed.
        base: String,
        /// The suffix ceiling that was exhausted.
        ceiling: u32,
    },

    /// A URL argument could not be fetched.
    #[error("failed to download {url}: {detail}")]
    Download {
        /// The URL that failed.
        url: String,
        /// What the downloader reported.
        detail: String,
    },

    /// Recursive extraction exceeded the nesting ceiling.
    #[error("giving up on {}: archives nested too deeply", path.display())]
    TooDeep {
        /// The archive that exceeded the ceiling.
        path: PathBuf,
    },
}

/// Result type alias for oxtract operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a missing-dependency error.
    pub fn missing_dependency(format: Format, tool: impl Into<String>) -> Self {
        Self::MissingDependency {
            format,
            tool: tool.into(),
        }
    }

    /// Create an extraction-failed error.
    pub fn extraction_failed(
        tool: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::ExtractionFailed {
            tool: tool.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Create a corrupt-archive error.
    pub fn corrupt(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Create an unsafe-entry error.
    pub fn unsafe_entry(entry: impl Into<String>) -> Self {
        Self::UnsafeEntry {
            entry: entry.into(),
        }
    }

    /// Create a download error.
    pub fn download(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// The missing binary's name, when this is a missing-dependency error.
    pub fn missing_tool(&self) -> Option<&str> {
        match self {
            Self::MissingDependency { tool, .. } => Some(tool),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::missing_dependency(Format::Rar, "unrar");
        assert!(err.to_string().contains("unrar"));
        assert!(err.to_string().contains("RAR"));

        let err = Error::extraction_failed("tar", Some(2), "unexpected EOF");
        assert!(err.to_string().contains("exit code 2"));
        assert!(err.to_string().contains("unexpected EOF"));

        let err = Error::extraction_failed("tar", None, "");
        assert!(err.to_string().contains("signal"));

        let err = Error::unsafe_entry("../etc/passwd");
        assert!(err.to_string().contains("../etc/passwd"));
    }

    #[test]
    fn test_missing_tool_accessor() {
        let err = Error::missing_dependency(Format::SevenZip, "7z");
        assert_eq!(err.missing_tool(), Some("7z"));
        let err = Error::unsafe_entry("x");
        assert_eq!(err.missing_tool(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
