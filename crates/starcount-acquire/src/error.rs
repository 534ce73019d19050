use crate::normalize::NormalizeError;
use crate::resolve::ResolveError;
use std::path::PathBuf;
use thiserror::Error;

/// Per-entry failure while fetching a star count.
///
/// The pipeline logs it, stores the sentinel for the entry and moves on.
/// It never converts into [`PipelineError`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("negative star count {count} from '{text}'")]
    NegativeCount { text: String, count: i64 },
}

/// Failure that aborts the whole run. No output file is written.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read dataset {}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode dataset {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to resolve URL for entry '{name}'")]
    Resolve {
        name: String,
        #[source]
        source: ResolveError,
    },

    #[error(transparent)]
    Origin(ResolveError),

    #[error("invalid star counter selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("failed to encode dataset")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write dataset {}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
