use axum::{
    extract::{Form, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Redirect, Response}
};
use dvorfs_client::{DownloadWorkflow, FetchOutcome, FormatType, UnknownFormatType};
use serde::Deserialize;
use tracing::Instrument;

use crate::attachment::Attachment;
use crate::error::AppError;
use crate::i18n::Locale;
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InfoForm {
    url: String
}

#[derive(Debug, Deserialize)]
pub struct FormatTypeForm {
    format_type: String
}

#[derive(Debug, Deserialize)]
pub struct SelectForm {
    format_id: String
}

fn back_to_page(session: &Session) -> Response {
    session.attach(Redirect::to("/").into_response())
}

/// Starts a metadata fetch and waits for it on a separate task, so a client
/// that disconnects mid-request cannot leave the session loading forever.
#[tracing::instrument(skip_all, fields(session = %session.id))]
pub async fn fetch_info(
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<InfoForm>
) -> Result<Response, AppError> {
    let ticket = state
        .with_workflow_or_insert(&session.id, |workflow| {
            workflow.set_url(input.url.trim());
            workflow.begin_fetch()
        })
        .await;

    let Some(ticket) = ticket else {
        tracing::debug!("ignoring info request without a url");
        return Ok(back_to_page(&session));
    };

    tracing::info!("Fetching video info for URL: {}", ticket.url);
    let task_state = state.clone();
    let session_id = session.id.clone();
    tokio::spawn(async move {
        let result = task_state.backend.video_info(&ticket.url).await;
        let outcome = task_state
            .with_workflow(&session_id, |workflow| workflow.finish_fetch(&ticket, result))
            .await;
        match outcome {
            Some(FetchOutcome::Stale) => {
                tracing::info!("Dropped superseded video info for {}", ticket.url);
            }
            None => tracing::debug!("session ended before video info arrived"),
            Some(_) => {}
        }
    }
    .in_current_span())
    .await?;

    Ok(back_to_page(&session))
}

#[tracing::instrument(skip_all, fields(session = %session.id))]
pub async fn change_format_type(
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<FormatTypeForm>
) -> Result<Response, AppError> {
    let format_type: FormatType = input
        .format_type
        .parse()
        .map_err(|e: UnknownFormatType| AppError::bad_request(e.to_string()))?;

    let changed = state
        .with_workflow(&session.id, |workflow| workflow.change_format_type(format_type))
        .await;
    if changed.is_none() && format_type != FormatType::default() {
        state
            .with_workflow_or_insert(&session.id, |workflow| workflow.change_format_type(format_type))
            .await;
    }

    Ok(back_to_page(&session))
}

#[tracing::instrument(skip_all, fields(session = %session.id))]
pub async fn select_format(
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<SelectForm>
) -> Response {
    let accepted = state
        .with_workflow(&session.id, |workflow| workflow.select_format(&input.format_id))
        .await
        .unwrap_or(false);
    if !accepted {
        tracing::warn!("Ignoring selection of unavailable format {}", input.format_id);
    }

    back_to_page(&session)
}

/// Runs the download on a separate task; see [`fetch_info`].
#[tracing::instrument(skip_all, fields(session = %session.id))]
pub async fn download(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    let ticket = state
        .with_workflow(&session.id, DownloadWorkflow::begin_download)
        .await
        .flatten();

    let Some(ticket) = ticket else {
        tracing::debug!("nothing selected to download");
        return Ok(back_to_page(&session));
    };

    tracing::info!(
        "Downloading {} as {} (quality {})",
        ticket.request.url,
        ticket.filename,
        ticket.request.quality
    );
    let task_state = state.clone();
    let session_id = session.id.clone();
    let attachment = tokio::spawn(async move {
        let result = task_state.backend.download(&ticket.request).await;
        let mut attachment = Attachment::default();
        let finished = task_state
            .with_workflow(&session_id, |workflow| {
                workflow.finish_download(&ticket, result, &mut attachment)
            })
            .await;
        if finished.is_none() {
            tracing::debug!("session ended before the download arrived");
        }
        attachment
    }
    .in_current_span())
    .await?;

    Ok(match attachment.into_response() {
        Some(response) => session.attach(response),
        None => back_to_page(&session)
    })
}

#[tracing::instrument(skip_all)]
pub async fn switch_locale(headers: HeaderMap) -> Response {
    let current = Locale::from_request(None, &headers);
    let next = current.toggled();
    tracing::debug!("Switching locale from {} to {}", current, next);

    let mut response = Redirect::to("/").into_response();
    if let Ok(cookie) = HeaderValue::from_str(&next.cookie()) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}
