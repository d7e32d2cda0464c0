//! Request-scoped context extracted from HTTP requests.
//!
//! Resolves the caller from `X-Auth-Token` and negotiates the microversion
//! from `OpenStack-API-Version` (or the legacy `X-OpenStack-Nova-API-Version`).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use computest_id::{ProjectId, RequestId, UserId};
use computest_model::microversion::{API_VERSION_HEADER, LEGACY_VERSION_HEADER};
use computest_model::{Microversion, RequestedVersion};
use tracing::debug;

use crate::api::error::ApiError;
use crate::state::AppState;

pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub admin: bool,
    pub microversion: Microversion,
}

impl RequestContext {
    /// Admins see everything; others only their own project's servers.
    pub fn can_see(&self, project_id: &ProjectId) -> bool {
        self.admin || &self.project_id == project_id
    }

    pub fn require_admin(&self, action: &str) -> Result<(), ApiError> {
        if self.admin {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "Policy doesn't allow {action} to be performed."
            ))
            .with_request_id(self.request_id.clone()))
        }
    }

    /// Shorthand for errors that carry this request's id.
    pub fn error(&self, err: ApiError) -> ApiError {
        err.with_request_id(self.request_id.clone())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn requested_version(headers: &HeaderMap) -> Result<Option<RequestedVersion>, ApiError> {
    if let Some(value) = header_str(headers, API_VERSION_HEADER) {
        match RequestedVersion::from_api_version_header(value) {
            Ok(Some(requested)) => return Ok(Some(requested)),
            Ok(None) => {}
            Err(e) => return Err(ApiError::bad_request(e.to_string())),
        }
    }

    if let Some(value) = header_str(headers, LEGACY_VERSION_HEADER) {
        return RequestedVersion::from_legacy_header(value)
            .map(Some)
            .map_err(|e| ApiError::bad_request(e.to_string()));
    }

    Ok(None)
}

/// Resolves the version to serve: no header means the minimum, `latest`
/// the maximum, and anything outside the range is refused with 406.
pub fn negotiate(
    requested: Option<RequestedVersion>,
    max: Microversion,
) -> Result<Microversion, ApiError> {
    match requested {
        None => Ok(Microversion::V2_1),
        Some(RequestedVersion::Latest) => Ok(max),
        Some(RequestedVersion::Exact(version))
            if version >= Microversion::V2_1 && version <= max =>
        {
            Ok(version)
        }
        Some(RequestedVersion::Exact(version)) => Err(ApiError::not_acceptable(format!(
            "Version {version} is not supported by the API. Minimum is {} and maximum is {max}.",
            Microversion::V2_1
        ))),
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let request_id = RequestId::new().header_value();

        let Some(token) = header_str(&parts.headers, AUTH_TOKEN_HEADER) else {
            return Err(ApiError::unauthorized(
                "The request you have made requires authentication.",
            )
            .with_request_id(request_id));
        };

        let Some(identity) = state.config().identity_for_token(token.trim()) else {
            return Err(ApiError::unauthorized("The token is not valid.")
                .with_request_id(request_id));
        };

        let microversion = requested_version(&parts.headers)
            .and_then(|requested| negotiate(requested, state.config().max_microversion))
            .map_err(|e| e.with_request_id(request_id.clone()))?;

        debug!(
            request_id = %request_id,
            project_id = %identity.project_id,
            admin = identity.admin,
            microversion = %microversion,
            "request context resolved"
        );

        Ok(Self {
            request_id,
            project_id: identity.project_id.clone(),
            user_id: identity.user_id.clone(),
            admin: identity.admin,
            microversion,
        })
    }
}
