use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, header, request::Parts},
    response::Response
};

pub const SESSION_COOKIE: &str = "session";

/// Reads one cookie out of the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

/// Browser session identified by the `session` cookie. A request without a
/// usable cookie gets a fresh id, which [`Session::attach`] hands back.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    is_new: bool
}

impl Session {
    pub fn fresh() -> Self {
        Self {
            id: uuid7::uuid7().to_string(),
            is_new: true
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        match cookie_value(headers, SESSION_COOKIE) {
            Some(id) if is_session_id(&id) => Self { id, is_new: false },
            _ => Self::fresh()
        }
    }

    pub fn cookie(&self) -> String {
        format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id)
    }

    pub fn attach(&self, mut response: Response) -> Response {
        if self.is_new {
            if let Ok(value) = HeaderValue::from_str(&self.cookie()) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

fn is_session_id(value: &str) -> bool {
    value.len() == 36 && value.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
}
