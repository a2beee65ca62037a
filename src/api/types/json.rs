//! JSON body extractor and responder using the API error envelope

use axum::{
    extract::{rejection::JsonRejection as AxumRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::{de::DeserializeOwned, Serialize};

use super::error::{ApiErrorDetail, ApiErrorResponse, ApiErrorType};

/// `axum::Json` whose rejections are rendered as `{"error": {...}}`
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

/// Body rejection keeping axum's status code
#[derive(Debug)]
pub struct JsonRejection {
    status: StatusCode,
    message: String,
}

impl From<AxumRejection> for JsonRejection {
    fn from(rejection: AxumRejection) -> Self {
        let message = match &rejection {
            AxumRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err.body_text()),
            AxumRejection::JsonSyntaxError(err) => {
                format!("Invalid JSON syntax: {}", err.body_text())
            }
            AxumRejection::MissingJsonContentType(_) => {
                "Missing Content-Type header. Expected 'application/json'.".to_string()
            }
            AxumRejection::BytesRejection(err) => {
                format!("Failed to read request body: {}", err.body_text())
            }
            _ => "Invalid JSON request".to_string(),
        };

        Self {
            status: rejection.status(),
            message,
        }
    }
}

impl IntoResponse for JsonRejection {
    fn into_response(self) -> Response {
        let body = ApiErrorResponse {
            error: ApiErrorDetail {
                message: self.message,
                error_type: ApiErrorType::InvalidRequestError,
                code: Some("json_parse_error".to_string()),
            },
        };

        (self.status, AxumJson(body)).into_response()
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AxumJson(value) = AxumJson::<T>::from_request(req, state).await?;
        Ok(Json(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}
