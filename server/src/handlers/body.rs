use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::utils::validation::{ValidationErrors, INVALID};
use crate::utils::AppError;

/// JSON request body whose rejections go through `AppError`.
///
/// A well-formed body with a wrongly typed value (a number for a uuid, an
/// unparseable timestamp) becomes a field error keyed by the JSON path, the
/// same shape the services return. Malformed JSON is a 400.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(&req) {
            return Err(AppError::BadRequest(
                "Expected request with `Content-Type: application/json`".to_string(),
            ));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        decode(&bytes).map(JsonBody)
    }
}

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json")
                || (mime.starts_with("application/") && mime.ends_with("+json"))
        })
        .unwrap_or(false)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);

    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        match inner.classify() {
            Category::Data => {
                tracing::debug!(%path, error = %inner, "Request body has an invalid field");
                // Root-level mismatches (a string instead of an object) have path ".".
                let field = if path == "." { "base" } else { path.as_str() };
                AppError::Validation(ValidationErrors::single(field, INVALID))
            }
            Category::Syntax | Category::Eof | Category::Io => {
                AppError::BadRequest(format!("Malformed JSON body: {inner}"))
            }
        }
    })?;

    deserializer
        .end()
        .map_err(|err| AppError::BadRequest(format!("Malformed JSON body: {err}")))?;

    Ok(value)
}
