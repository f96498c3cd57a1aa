use crate::handlers::{error_fragment, hx_redirect};
use crate::middleware::auth::{is_authenticated, AUTHENTICATED_KEY};
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use service_core::utils::credentials::verify_credentials;
use tower_sessions::Session;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub current_page: &'static str,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login_page(session: Session) -> Response {
    if is_authenticated(&session).await {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        current_page: "login",
    }
    .into_response()
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<LoginRequest>,
) -> Response {
    let (Some(username), Some(password)) = (&state.auth.username, &state.auth.password) else {
        tracing::error!("Login attempted but no operator credentials are configured");
        return error_fragment(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Login is not configured on this server",
        );
    };

    if !verify_credentials(
        username,
        password.expose_secret(),
        &payload.username,
        &payload.password,
    ) {
        tracing::warn!(username = %payload.username, "Rejected login attempt");
        return error_fragment(StatusCode::UNAUTHORIZED, "Invalid username or password");
    }

    // New session id on privilege change
    if let Err(e) = session.cycle_id().await {
        tracing::error!(error = %e, "Failed to rotate session id");
        return error_fragment(StatusCode::INTERNAL_SERVER_ERROR, "Session error");
    }
    if let Err(e) = session.insert(AUTHENTICATED_KEY, true).await {
        tracing::error!(error = %e, "Failed to store session");
        return error_fragment(StatusCode::INTERNAL_SERVER_ERROR, "Session error");
    }

    tracing::info!(username = %payload.username, "Operator logged in");
    hx_redirect("/")
}

pub async fn logout_handler(session: Session) -> Response {
    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to clear session during logout");
    } else {
        tracing::info!("Operator logged out");
    }

    hx_redirect("/login")
}
