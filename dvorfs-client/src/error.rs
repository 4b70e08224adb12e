use reqwest::StatusCode;

/// Why a single backend call did not produce a usable response.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend responded with status {0}")]
    Status(StatusCode),

    #[error("failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error)
}

/// The two failure kinds the workflow surfaces. Their `Display` output is the
/// message shown to the user; the cause is kept for logging.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to fetch video information")]
    InfoFetch(#[source] Failure),

    #[error("Download failed")]
    Download(#[source] Failure)
}

impl Error {
    pub fn failure(&self) -> &Failure {
        match self {
            Error::InfoFetch(failure) | Error::Download(failure) => failure
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
