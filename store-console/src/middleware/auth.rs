use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::handlers::hx_redirect;

/// Session key set once the operator has logged in.
pub const AUTHENTICATED_KEY: &str = "authenticated";

/// Whether this session belongs to a logged-in operator.
pub async fn is_authenticated(session: &Session) -> bool {
    session
        .get::<bool>(AUTHENTICATED_KEY)
        .await
        .unwrap_or(None)
        .unwrap_or(false)
}

/// Send anonymous visitors to the login page.
///
/// HTMX requests get `HX-Redirect` so the login page replaces the whole
/// window instead of being swapped into a fragment target.
pub async fn auth_middleware(session: Session, request: Request<Body>, next: Next) -> Response {
    if !is_authenticated(&session).await {
        tracing::debug!(path = %request.uri().path(), "Unauthenticated request redirected to login");
        if request.headers().contains_key("HX-Request") {
            return hx_redirect("/login");
        }
        return Redirect::to("/login").into_response();
    }

    next.run(request).await
}
