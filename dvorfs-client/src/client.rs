use std::future::Future;

use crate::error::{Error, Failure, Result};
use crate::types::{DownloadRequest, InfoRequest, VideoInfo};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// The two calls the workflow makes against the video backend.
pub trait Backend {
    fn video_info(&self, url: &str) -> impl Future<Output = Result<VideoInfo>> + Send;

    fn download(&self, request: &DownloadRequest) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    download_url: String
}

impl Default for BackendClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = trim_base(base_url.into());
        Self {
            http: reqwest::Client::new(),
            download_url: base_url.clone(),
            base_url
        }
    }

    /// Serve `/download` from a different host than `/video/info`.
    pub fn with_download_url(mut self, download_url: impl Into<String>) -> Self {
        self.download_url = trim_base(download_url.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn download_url(&self) -> &str {
        &self.download_url
    }

    pub async fn video_info(&self, url: &str) -> Result<VideoInfo> {
        let endpoint = format!("{}/video/info", self.base_url);
        let body = InfoRequest { url: url.to_string() };

        tracing::debug!(endpoint = %endpoint, url = %url, "requesting video info");

        let bytes = self
            .post(&endpoint, &body)
            .await
            .map_err(Error::InfoFetch)?;
        let info: VideoInfo = serde_json::from_slice(&bytes)
            .map_err(|e| Error::InfoFetch(Failure::Decode(e)))?;

        tracing::debug!(title = %info.title, formats = info.formats.len(), "received video info");
        Ok(info)
    }

    pub async fn download(&self, request: &DownloadRequest) -> Result<Vec<u8>> {
        let endpoint = format!("{}/download", self.download_url);

        tracing::debug!(
            endpoint = %endpoint,
            quality = %request.quality,
            format_type = %request.format_type,
            "requesting download"
        );

        let bytes = self
            .post(&endpoint, request)
            .await
            .map_err(Error::Download)?;

        tracing::debug!(bytes = bytes.len(), "received download payload");
        Ok(bytes)
    }

    async fn post<B: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B
    ) -> std::result::Result<Vec<u8>, Failure> {
        let response = self.http.post(endpoint).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Failure::Status(status));
        }

        Ok(Vec::from(response.bytes().await?))
    }
}

impl Backend for BackendClient {
    async fn video_info(&self, url: &str) -> Result<VideoInfo> {
        BackendClient::video_info(self, url).await
    }

    async fn download(&self, request: &DownloadRequest) -> Result<Vec<u8>> {
        BackendClient::download(self, request).await
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
