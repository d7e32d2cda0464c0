use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use computest_model::fault::fault_body;
use computest_model::FaultKind;
use tracing::error;

use crate::api::response::REQUEST_ID_HEADER;

/// An error rendered as a compute fault body:
/// `{"badRequest": {"code": 400, "message": "..."}}`.
#[derive(Debug)]
pub struct ApiError {
    pub kind: FaultKind,
    pub message: String,
    pub request_id: Option<String>,
}

impl ApiError {
    fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            request_id: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(FaultKind::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FaultKind::ItemNotFound, message)
    }

    pub fn not_acceptable(message: impl Into<String>) -> Self {
        Self::new(FaultKind::NotAcceptable, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(FaultKind::ConflictingRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FaultKind::ComputeFault, message)
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.kind.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.kind == FaultKind::ComputeFault {
            error!(
                request_id = self.request_id.as_deref().unwrap_or("-"),
                message = %self.message,
                "compute fault"
            );
        }
        let mut response = (status, Json(fault_body(self.kind, self.message))).into_response();
        if let Some(value) = self
            .request_id
            .and_then(|id| HeaderValue::from_str(&id).ok())
        {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
}
