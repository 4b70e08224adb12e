use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response}
};

/// Failure of a page request itself. Backend failures never end up here;
/// the workflow keeps those as messages on the page.
#[derive(Debug)]
pub struct AppError {
    pub message: String,
    pub status: StatusCode
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    status: StatusCode,
    message: &'a str
}

impl AppError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: StatusCode::BAD_REQUEST
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "handler error: {}", self.message);
        } else {
            tracing::warn!(status = %self.status, "rejected request: {}", self.message);
        }

        let page = ErrorTemplate {
            status: self.status,
            message: &self.message
        };
        match page.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("failed to render error page: {}", e);
                (self.status, self.message).into_response()
            }
        }
    }
}

impl<E: std::error::Error> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError::internal(err.to_string())
    }
}
