//! Successful responses, stamped with the negotiated microversion.

use axum::{
    http::{header::VARY, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;

pub const REQUEST_ID_HEADER: &str = "x-openstack-request-id";

#[derive(Debug)]
pub struct ComputeResponse {
    status: StatusCode,
    body: Option<Value>,
    ctx: RequestContext,
}

impl ComputeResponse {
    pub fn empty(ctx: &RequestContext, status: StatusCode) -> Self {
        Self {
            status,
            body: None,
            ctx: ctx.clone(),
        }
    }

    pub fn json(
        ctx: &RequestContext,
        status: StatusCode,
        body: &impl Serialize,
    ) -> Result<Self, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| {
            ApiError::internal(format!("failed to render response: {e}"))
                .with_request_id(ctx.request_id.clone())
        })?;
        Ok(Self {
            status,
            body: Some(body),
            ctx: ctx.clone(),
        })
    }
}

fn insert(response: &mut Response, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(name), value);
    }
}

impl IntoResponse for ComputeResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        };

        let version = self.ctx.microversion;
        insert(&mut response, "openstack-api-version", &version.header_value());
        insert(&mut response, "x-openstack-nova-api-version", &version.to_string());
        insert(&mut response, REQUEST_ID_HEADER, &self.ctx.request_id);
        response.headers_mut().insert(
            VARY,
            HeaderValue::from_static("OpenStack-API-Version, X-OpenStack-Nova-API-Version"),
        );
        response
    }
}
