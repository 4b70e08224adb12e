use std::convert::Infallible;

use axum::{
    http::{HeaderValue, header},
    response::{IntoResponse, Response}
};
use dvorfs_client::SaveTarget;

/// Save target that turns the payload into a browser download.
#[derive(Debug, Default)]
pub struct Attachment {
    file: Option<(String, Vec<u8>)>
}

impl SaveTarget for Attachment {
    type Error = Infallible;

    fn save(&mut self, filename: &str, payload: Vec<u8>) -> Result<(), Infallible> {
        self.file = Some((filename.to_string(), payload));
        Ok(())
    }
}

impl Attachment {
    /// `None` when nothing was saved.
    pub fn into_response(self) -> Option<Response> {
        let (filename, payload) = self.file?;

        let mut response = payload.into_response();
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type(&filename)));
        if let Ok(value) = HeaderValue::from_str(&content_disposition(&filename)) {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
        Some(response)
    }
}

fn content_type(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some("mp4") => "video/mp4",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream"
    }
}

/// Plain `filename` for old clients plus an RFC 5987 `filename*` carrying the
/// real UTF-8 title.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_'
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}
