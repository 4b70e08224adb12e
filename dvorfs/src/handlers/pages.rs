use askama::Template;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response}
};
use dvorfs_client::{DownloadWorkflow, FormatType};
use serde::Deserialize;

use crate::error::AppError;
use crate::i18n::{Locale, Messages};
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    locale: Option<String>
}

pub struct FormatOption {
    pub id: String,
    pub label: String,
    pub selected: bool
}

pub struct VideoCard {
    pub title: String,
    pub uploader: String,
    pub views: String,
    pub duration: String,
    pub thumbnail: String
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    t: Messages<'a>,
    lang: &'static str,
    other_flag: &'static str,
    flag: &'static str,
    url: String,
    is_audio: bool,
    formats: Vec<FormatOption>,
    video: Option<VideoCard>,
    error: Option<String>,
    success: Option<String>,
    loading: bool,
    downloading: bool
}

impl<'a> IndexTemplate<'a> {
    fn new(t: Messages<'a>, locale: Locale, workflow: &DownloadWorkflow) -> Self {
        let state = workflow.state();
        let selected = workflow.selected().map(|f| f.format_id.as_str());

        let formats = workflow
            .available_formats()
            .into_iter()
            .map(|f| FormatOption {
                id: f.format_id.clone(),
                label: f.label(),
                selected: selected == Some(f.format_id.as_str())
            })
            .collect();

        let video = state.video_info.as_ref().map(|info| VideoCard {
            title: info.title.clone(),
            uploader: info.uploader.clone(),
            views: info.view_count_display(),
            duration: info.duration_display(),
            thumbnail: info.thumbnail.clone()
        });

        Self {
            t,
            lang: locale.code(),
            flag: locale.flag(),
            other_flag: locale.toggled().flag(),
            url: state.url.clone(),
            is_audio: state.format_type == FormatType::Audio,
            formats,
            video,
            error: state.error.clone(),
            success: state.success.clone(),
            loading: state.loading,
            downloading: state.downloading
        }
    }
}

#[tracing::instrument(skip_all, fields(session = %session.id))]
pub async fn home_page(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Query(query): Query<PageQuery>
) -> Result<Response, AppError> {
    let locale = Locale::from_request(query.locale.as_deref(), &headers);
    let workflow = state.snapshot(&session.id).await;

    let template = IndexTemplate::new(state.translations.messages(locale), locale, &workflow);
    let html = Html(template.render()?).into_response();
    Ok(session.attach(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Translations;
    use dvorfs_client::{Error, Failure, Format, VideoInfo};
    use reqwest::StatusCode;

    fn workflow() -> DownloadWorkflow {
        let mut workflow = DownloadWorkflow::new();
        workflow.set_url("https://example.com/watch?v=1");
        let ticket = workflow.begin_fetch().unwrap();
        workflow.finish_fetch(
            &ticket,
            Ok(VideoInfo {
                title: "Song <live>".to_string(),
                duration: 125,
                uploader: "Artist".to_string(),
                view_count: 1_000,
                thumbnail: "https://example.com/t.jpg".to_string(),
                formats: vec![
                    Format {
                        format_id: "137".to_string(),
                        ext: "mp4".to_string(),
                        resolution: "1920x1080".to_string(),
                        filesize: 1_048_576,
                        format_note: "1080p".to_string(),
                        vcodec: "avc1".to_string(),
                        acodec: "none".to_string(),
                        quality: 1080.0,
                        format_type: FormatType::Video
                    },
                    Format {
                        format_id: "140".to_string(),
                        ext: "m4a".to_string(),
                        resolution: String::new(),
                        filesize: 0,
                        format_note: "medium".to_string(),
                        vcodec: "none".to_string(),
                        acodec: "mp4a".to_string(),
                        quality: 128.0,
                        format_type: FormatType::Audio
                    }
                ]
            })
        );
        workflow
    }

    #[test]
    fn test_render_loaded_page() {
        let translations = Translations::load().unwrap();
        let template = IndexTemplate::new(translations.messages(Locale::En), Locale::En, &workflow());
        let html = template.render().unwrap();

        assert!(html.contains("Song &lt;live&gt;"));
        assert!(html.contains("2:05"));
        assert!(html.contains("1,000"));
        assert!(html.contains(r#"value="137" selected"#));
        assert!(!html.contains(r#"value="140""#));
        assert!(html.contains("Download Now"));
    }

    #[test]
    fn test_render_empty_page_in_russian() {
        let translations = Translations::load().unwrap();
        let template = IndexTemplate::new(
            translations.messages(Locale::Ru),
            Locale::Ru,
            &DownloadWorkflow::new()
        );
        let html = template.render().unwrap();

        assert!(html.contains(r#"<html lang="ru">"#));
        assert!(html.contains("Получить информацию"));
        assert!(html.contains("disabled"));
        assert!(!html.contains("quality-select"));
    }

    #[test]
    fn test_render_marks_every_error_kind() {
        let translations = Translations::load().unwrap();

        let mut failed = DownloadWorkflow::new();
        failed.set_url("https://example.com/watch?v=2");
        let ticket = failed.begin_fetch().unwrap();
        failed.finish_fetch(&ticket, Err(Error::InfoFetch(Failure::Status(StatusCode::BAD_GATEWAY))));
        let html = IndexTemplate::new(translations.messages(Locale::En), Locale::En, &failed)
            .render()
            .unwrap();
        assert!(html.contains("❌ Failed to fetch video information"));

        let mut workflow = workflow();
        let ticket = workflow.begin_download().unwrap();
        workflow.finish_download(
            &ticket,
            Err(Error::Download(Failure::Status(StatusCode::BAD_GATEWAY))),
            &mut crate::attachment::Attachment::default()
        );
        let html = IndexTemplate::new(translations.messages(Locale::En), Locale::En, &workflow)
            .render()
            .unwrap();
        assert!(html.contains("❌ Download failed"));
        assert!(!html.contains("❌ ❌"));
    }
}
