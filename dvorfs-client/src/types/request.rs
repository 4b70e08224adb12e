use serde::Serialize;

use super::FormatType;

/// Body of `POST /video/info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoRequest {
    pub url: String
}

/// Body of `POST /download`. `quality` is the chosen format's quality rank
/// rendered as text, not its format id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadRequest {
    pub url: String,
    pub quality: String,
    pub format_type: FormatType
}
