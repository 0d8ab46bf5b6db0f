use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub type ApiResult<T> = Result<ApiReply<T>, AppError>;

/// Wire envelope shared by every endpoint. The client library deserializes
/// the same shape, so it lives here rather than in the route modules.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug)]
pub struct ApiReply<T: Serialize> {
    status: StatusCode,
    envelope: ApiEnvelope<T>,
}

impl<T: Serialize> ApiReply<T> {
    pub fn ok(data: T) -> ApiResult<T> {
        Ok(Self {
            status: StatusCode::OK,
            envelope: ApiEnvelope {
                success: true,
                data,
                message: None,
            },
        })
    }

    pub fn created(data: T) -> ApiResult<T> {
        Ok(Self {
            status: StatusCode::CREATED,
            envelope: ApiEnvelope {
                success: true,
                data,
                message: None,
            },
        })
    }

    pub fn ok_with_message(message: impl Into<String>, data: T) -> ApiResult<T> {
        Ok(Self {
            status: StatusCode::OK,
            envelope: ApiEnvelope {
                success: true,
                data,
                message: Some(message.into()),
            },
        })
    }
}

impl<T: Serialize> IntoResponse for ApiReply<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let envelope = ApiEnvelope {
            success: false,
            data: serde_json::Value::Null,
            message: Some(self.message().to_string()),
        };
        (status_for(&self), Json(envelope)).into_response()
    }
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
