pub mod app;
pub mod auth;
pub mod documents;
pub mod metrics;
pub mod operations;
pub mod stores;
pub mod upload;

use askama::Template;
use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

/// Inline error message swapped into a form by HTMX.
#[derive(Template)]
#[template(path = "fragments/form_error.html")]
pub struct FormErrorTemplate<'a> {
    pub message: &'a str,
}

pub(crate) fn error_fragment(status: StatusCode, message: &str) -> Response {
    (status, FormErrorTemplate { message }).into_response()
}

/// Full-page navigation for an HTMX request.
pub(crate) fn hx_redirect(location: &'static str) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("HX-Redirect", HeaderValue::from_static(location));
    (StatusCode::OK, headers, "").into_response()
}

/// Query string shared by the list pages: paging plus one-shot banners.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page_token: Option<String>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Redirect after a form post, carrying a banner message in the query.
pub(crate) fn redirect_with(path: &str, key: &str, message: &str) -> Redirect {
    match serde_urlencoded::to_string([(key, message)]) {
        Ok(query) => Redirect::to(&format!("{}?{}", path, query)),
        Err(_) => Redirect::to(path),
    }
}

/// Query string fragment for a "next page" link.
pub(crate) fn page_link(path: &str, token: &str) -> String {
    match serde_urlencoded::to_string([("page_token", token)]) {
        Ok(query) => format!("{}?{}", path, query),
        Err(_) => path.to_string(),
    }
}
