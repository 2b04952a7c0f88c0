//! JSON extractor whose rejections use the API error body

use axum::{
    extract::{rejection::JsonRejection as AxumJsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::{de::DeserializeOwned, Serialize};

use super::error::ApiError;

/// `axum::Json` replacement; every body problem becomes `BAD_REQUEST`
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        AxumJson::<T>::from_request(req, state)
            .await
            .map(|AxumJson(value)| Json(value))
            .map_err(|rejection| ApiError::bad_request(rejection_message(&rejection)))
    }
}

fn rejection_message(rejection: &AxumJsonRejection) -> String {
    match rejection {
        AxumJsonRejection::JsonDataError(err) => {
            format!("Invalid request body: {}", err.body_text())
        }
        AxumJsonRejection::JsonSyntaxError(err) => format!("Malformed JSON: {}", err.body_text()),
        AxumJsonRejection::MissingJsonContentType(_) => {
            "Expected 'Content-Type: application/json'".to_string()
        }
        other => other.body_text(),
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde::Deserialize;

    use crate::api::types::ApiErrorCode;

    #[derive(Debug, Deserialize)]
    struct CreateBody {
        name: String,
    }

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn reject(req: Request) -> ApiError {
        Json::<CreateBody>::from_request(req, &()).await.unwrap_err()
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let err = reject(request(Some("application/json"), "{\"name\": ")).await;

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message().starts_with("Malformed JSON"));
    }

    #[tokio::test]
    async fn test_missing_field() {
        let err = reject(request(Some("application/json"), "{}")).await;

        assert_eq!(err.code(), ApiErrorCode::BadRequest);
        assert!(err.message().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let err = reject(request(None, "{\"name\": \"Acme\"}")).await;

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message().contains("application/json"));
    }

    #[tokio::test]
    async fn test_valid_body() {
        let req = request(Some("application/json"), "{\"name\": \"Acme\"}");

        let Json(body) = Json::<CreateBody>::from_request(req, &()).await.unwrap();
        assert_eq!(body.name, "Acme");
    }
}
