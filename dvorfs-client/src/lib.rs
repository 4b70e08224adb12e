//! Client for the Dvorfs video backend.
//!
//! This library provides a typed async client for the backend's metadata and
//! download endpoints, plus the workflow controller that drives a
//! fetch / pick quality / download session on top of it.
//!
//! # Example
//!
//! ```no_run
//! use dvorfs_client::{BackendClient, DownloadWorkflow, FormatType, SaveTarget};
//!
//! struct ToDisk;
//!
//! impl SaveTarget for ToDisk {
//!     type Error = std::io::Error;
//!
//!     fn save(&mut self, filename: &str, payload: Vec<u8>) -> std::io::Result<()> {
//!         std::fs::write(filename, payload)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = BackendClient::new("http://localhost:8000");
//!     let mut workflow = DownloadWorkflow::new();
//!
//!     workflow.set_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
//!     workflow.change_format_type(FormatType::Audio);
//!     workflow.fetch_video_info(&backend).await;
//!
//!     for format in workflow.available_formats() {
//!         println!("{}", format.label());
//!     }
//!
//!     workflow.download_selection(&backend, &mut ToDisk).await;
//!     if let Some(error) = &workflow.state().error {
//!         eprintln!("{error}");
//!     }
//! }
//! ```

mod client;
pub mod error;
pub mod types;
mod workflow;

pub use client::{Backend, BackendClient, DEFAULT_BASE_URL};
pub use error::{Error, Failure, Result};
pub use types::{DownloadRequest, Format, FormatType, InfoRequest, UnknownFormatType, VideoInfo};
pub use workflow::{
    DOWNLOAD_COMPLETED, DownloadTicket, DownloadWorkflow, FetchOutcome, FetchTicket, SaveTarget,
    WorkflowState
};
