use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

/// CORS for the browser client. `auth_header` is the forwarded user header,
/// which the client must be allowed to send.
pub fn create_cors_layer(origins: &[String], auth_header: &str) -> CorsLayer {
    let mut allowed_headers = vec![
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        header::ACCEPT,
        header::ORIGIN,
        HeaderName::from_static("x-requested-with"),
    ];
    match HeaderName::try_from(auth_header) {
        Ok(name) => allowed_headers.push(name),
        Err(e) => tracing::warn!("CORS: Invalid auth header name '{}': {}", auth_header, e),
    }

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list(allowed_headers))
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(PREFLIGHT_MAX_AGE_SECS));

    match parse_origins(origins) {
        Some(list) => layer.allow_origin(list).allow_credentials(true),
        None => {
            // Credentials cannot be combined with a wildcard origin.
            tracing::warn!(
                "CORS: No valid origins configured, allowing any origin without credentials"
            );
            layer.allow_origin(AllowOrigin::any())
        }
    }
}

fn parse_origins(origins: &[String]) -> Option<AllowOrigin> {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => {
                tracing::debug!("CORS: Allowing origin: {}", origin);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        return None;
    }
    tracing::info!("CORS: Configured with {} allowed origin(s)", parsed.len());
    Some(AllowOrigin::list(parsed))
}
