mod request;
mod video_info;

pub use request::{DownloadRequest, InfoRequest};
pub use video_info::{Format, FormatType, UnknownFormatType, VideoInfo};
