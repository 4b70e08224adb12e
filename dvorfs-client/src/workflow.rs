//! The fetch / pick / download state machine behind the page.
//!
//! A [`DownloadWorkflow`] owns every piece of UI state and only changes it
//! through the operations below. Network calls are split into a `begin_*`
//! step that records the request and hands back a ticket, and a `finish_*`
//! step that applies the result, so a host can drop its lock on the workflow
//! while the request is in flight. [`DownloadWorkflow::fetch_video_info`] and
//! [`DownloadWorkflow::download_selection`] chain both steps for callers that
//! own the workflow outright.

use crate::client::Backend;
use crate::error::Result;
use crate::types::{DownloadRequest, Format, FormatType, VideoInfo};

pub const DOWNLOAD_COMPLETED: &str = "✅ Download completed successfully!";

/// Where a downloaded payload ends up. The payload is moved in so the
/// buffer is released as soon as the target returns.
pub trait SaveTarget {
    type Error: std::error::Error;

    fn save(&mut self, filename: &str, payload: Vec<u8>) -> std::result::Result<(), Self::Error>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowState {
    pub url: String,
    pub format_type: FormatType,
    pub selected_format: String,
    pub video_info: Option<VideoInfo>,
    pub loading: bool,
    pub downloading: bool,
    pub error: Option<String>,
    pub success: Option<String>
}

/// Issued by [`DownloadWorkflow::begin_fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    pub url: String
}

/// Issued by [`DownloadWorkflow::begin_download`].
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadTicket {
    generation: u64,
    pub request: DownloadRequest,
    pub filename: String
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded,
    Failed,
    /// A newer fetch was started after this one; the result was dropped.
    Stale
}

#[derive(Debug, Clone, Default)]
pub struct DownloadWorkflow {
    state: WorkflowState,
    fetch_generation: u64,
    download_generation: u64
}

impl DownloadWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Formats of the active category, in backend order.
    pub fn available_formats(&self) -> Vec<&Format> {
        match self.state.video_info {
            Some(ref info) => info.formats_of(self.state.format_type).collect(),
            None => Vec::new()
        }
    }

    pub fn selected(&self) -> Option<&Format> {
        let info = self.state.video_info.as_ref()?;
        info.find_format(self.state.format_type, &self.state.selected_format)
    }

    /// Replaces the URL text. Editing the URL clears stale messages.
    pub fn set_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        if url != self.state.url {
            self.state.error = None;
            self.state.success = None;
            self.state.url = url;
        }
    }

    pub fn change_format_type(&mut self, format_type: FormatType) {
        self.state.format_type = format_type;
        self.reselect();
    }

    /// Returns `false` and leaves the selection alone when `format_id` is not
    /// one of the available formats.
    pub fn select_format(&mut self, format_id: &str) -> bool {
        let known = self
            .state
            .video_info
            .as_ref()
            .is_some_and(|info| info.find_format(self.state.format_type, format_id).is_some());
        if known {
            self.state.selected_format = format_id.to_string();
        }
        known
    }

    /// Starts a metadata request for the current URL. Returns `None` when the
    /// URL is empty.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.state.url.trim().is_empty() {
            return None;
        }

        self.fetch_generation += 1;
        self.state.loading = true;
        self.state.error = None;
        self.state.success = None;
        self.state.video_info = None;
        self.state.selected_format.clear();

        Some(FetchTicket {
            generation: self.fetch_generation,
            url: self.state.url.clone()
        })
    }

    pub fn finish_fetch(&mut self, ticket: &FetchTicket, result: Result<VideoInfo>) -> FetchOutcome {
        if ticket.generation != self.fetch_generation {
            tracing::debug!(
                generation = ticket.generation,
                current = self.fetch_generation,
                "discarding stale video info response"
            );
            return FetchOutcome::Stale;
        }

        self.state.loading = false;
        match result {
            Ok(info) => {
                tracing::info!(title = %info.title, formats = info.formats.len(), "loaded video info");
                self.state.video_info = Some(info);
                self.reselect();
                FetchOutcome::Loaded
            }
            Err(e) => {
                tracing::warn!(url = %ticket.url, error = %e, cause = %e.failure(), "video info request failed");
                self.state.video_info = None;
                self.state.error = Some(e.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Starts a download of the selected format. Returns `None`, and changes
    /// nothing, unless video info is loaded and the selection is one of the
    /// available formats.
    pub fn begin_download(&mut self) -> Option<DownloadTicket> {
        let info = self.state.video_info.as_ref()?;
        if self.state.selected_format.is_empty() {
            return None;
        }
        let format = info.find_format(self.state.format_type, &self.state.selected_format)?;

        let format_type = self.state.format_type;
        let request = DownloadRequest {
            url: self.state.url.clone(),
            quality: format.quality_param(),
            format_type
        };
        let filename = format!("{}.{}", info.title, format_type.file_extension());

        self.download_generation += 1;
        self.state.downloading = true;
        self.state.error = None;

        Some(DownloadTicket {
            generation: self.download_generation,
            request,
            filename
        })
    }

    /// Hands a successful payload to `target`. Download results are applied
    /// even if another request started meanwhile; only the `downloading` flag
    /// is left to the newest ticket.
    pub fn finish_download<T: SaveTarget>(
        &mut self,
        ticket: &DownloadTicket,
        result: Result<Vec<u8>>,
        target: &mut T
    ) -> bool {
        if ticket.generation == self.download_generation {
            self.state.downloading = false;
        }

        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(url = %ticket.request.url, error = %e, cause = %e.failure(), "download request failed");
                self.state.error = Some(e.to_string());
                return false;
            }
        };

        let size = payload.len();
        match target.save(&ticket.filename, payload) {
            Ok(()) => {
                tracing::info!(filename = %ticket.filename, bytes = size, "download handed to save target");
                self.state.success = Some(DOWNLOAD_COMPLETED.to_string());
                true
            }
            Err(e) => {
                tracing::warn!(filename = %ticket.filename, error = %e, "failed to save download");
                self.state.error = Some(e.to_string());
                false
            }
        }
    }

    pub async fn fetch_video_info<B: Backend>(&mut self, backend: &B) -> Option<FetchOutcome> {
        let ticket = self.begin_fetch()?;
        let result = backend.video_info(&ticket.url).await;
        Some(self.finish_fetch(&ticket, result))
    }

    /// Returns `None` when nothing was requested.
    pub async fn download_selection<B: Backend, T: SaveTarget>(
        &mut self,
        backend: &B,
        target: &mut T
    ) -> Option<bool> {
        let ticket = self.begin_download()?;
        let result = backend.download(&ticket.request).await;
        Some(self.finish_download(&ticket, result, target))
    }

    fn reselect(&mut self) {
        self.state.selected_format = self
            .available_formats()
            .first()
            .map(|f| f.format_id.clone())
            .unwrap_or_default();
    }
}
