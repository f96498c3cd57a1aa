use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// CSP for server-rendered console pages: inline styles and the htmx bundle.
const CONSOLE_CSP: &str = "default-src 'self'; \
     script-src 'self' https://unpkg.com; \
     style-src 'self' 'unsafe-inline'; \
     img-src 'self' data:; \
     form-action 'self'; \
     frame-ancestors 'none'";

/// CSP for machine endpoints that never render HTML.
const STRICT_CSP: &str = "default-src 'none'; frame-ancestors 'none'";

fn is_machine_route(path: &str) -> bool {
    path == "/health" || path == "/metrics"
}

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let strict = is_machine_route(req.uri().path());

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        header::HeaderValue::from_static(if strict { STRICT_CSP } else { CONSOLE_CSP }),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request as HttpRequest, middleware::from_fn, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "page" }))
            .route("/health", get(|| async { "OK" }))
            .layer(from_fn(security_headers_middleware))
    }

    async fn csp_for(uri: &str) -> String {
        let response = app()
            .oneshot(HttpRequest::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response
            .headers()
            .get(header::CONTENT_SECURITY_POLICY)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_pages_get_console_policy() {
        assert!(csp_for("/").await.contains("script-src 'self' https://unpkg.com"));
    }

    #[tokio::test]
    async fn test_health_gets_strict_policy() {
        assert_eq!(csp_for("/health").await, STRICT_CSP);
    }
}
