use std::path::PathBuf;

use thiserror::Error;

/// Failures while locating, unpacking or decoding an export
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unrecognized file name: {}", .0.display())]
    UnrecognizedFile(PathBuf),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid or corrupt ZIP archive {}: {source}", .path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to decode {name}: {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No entry matching '{pattern}' in {}; archive contains: {}", .archive.display(), .available.join(", "))]
    NoMatchingEntries {
        archive: PathBuf,
        pattern: String,
        available: Vec<String>,
    },

    #[error("No recognized export files found in {}", .0.display())]
    NoExports(PathBuf),
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
