use std::path::PathBuf;

/// Failure talking to a monitoring backend. Propagated as a value to
/// the caller of a refresh; never panics, never stops a poll loop.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure reading or writing the persisted client settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings io failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file is malformed: {0}")]
    Decode(#[from] serde_json::Error),
}
