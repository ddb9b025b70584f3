use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Blupd8Error>;

#[derive(Error, Debug)]
pub enum Blupd8Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Listing unreachable: {url} ({message})")]
    ListingUnreachable { url: String, message: String },

    #[error("Malformed listing line: '{line}'")]
    MalformedListing { line: String },

    #[error("Project '{project}' not found in release catalog")]
    UnknownProject { project: String },

    #[error("Version '{version}' not found (available: {})", available.join(", "))]
    VersionNotFound {
        version: String,
        available: Vec<String>,
    },

    #[error(
        "No package matching platform '{platform}' and type '{package_type}' (available: {})",
        available.join(", ")
    )]
    NoMatchingPackage {
        platform: String,
        package_type: String,
        available: Vec<String>,
    },

    #[error("Download failed: {url} ({message})")]
    DownloadFailed { url: String, message: String },

    #[error("Target directory already exists: {path}")]
    TargetExists { path: PathBuf },

    #[error("Extraction failed: {path} ({message})")]
    ArchiveExtraction { path: PathBuf, message: String },

    #[error("Unsupported archive format: {path}")]
    UnsupportedArchive { path: PathBuf },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },
}

impl Blupd8Error {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        Blupd8Error::ConfigError {
            message: message.into(),
        }
    }

    pub fn unreachable<U: Into<String>, M: ToString>(url: U, message: M) -> Self {
        Blupd8Error::ListingUnreachable {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn download_failed<U: Into<String>, M: ToString>(url: U, message: M) -> Self {
        Blupd8Error::DownloadFailed {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn extraction<P: Into<PathBuf>, M: ToString>(path: P, message: M) -> Self {
        Blupd8Error::ArchiveExtraction {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
