//! Compute API v2.1 routes.

mod actions;
mod flavors;
mod servers;

use axum::{
    body::Bytes,
    routing::{get, post},
    Router,
};
use computest_id::ServerId;
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::state::AppState;
use crate::store::{ServerRecord, ServerStore};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/servers",
            get(servers::list_servers).post(servers::create_server),
        )
        .route("/servers/detail", get(servers::list_servers_detail))
        .route(
            "/servers/{server_id}",
            get(servers::show_server)
                .put(servers::update_server)
                .delete(servers::delete_server),
        )
        .route("/servers/{server_id}/action", post(actions::server_action))
        .route("/flavors/{flavor_id}", get(flavors::show_flavor))
}

/// Decodes a JSON body, turning serde errors into a `badRequest` fault
/// rather than axum's plain-text rejection.
fn parse_body<T: DeserializeOwned>(ctx: &RequestContext, body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ctx.error(ApiError::bad_request(format!("Invalid request body: {e}"))))
}

fn not_found(ctx: &RequestContext, raw_id: &str) -> ApiError {
    ctx.error(ApiError::not_found(format!(
        "Instance {raw_id} could not be found."
    )))
}

/// Looks up a server the caller is allowed to see. Servers of other
/// projects are reported as missing, not forbidden.
fn find_server<'a>(
    store: &'a ServerStore,
    ctx: &RequestContext,
    raw_id: &str,
) -> Result<&'a ServerRecord, ApiError> {
    let id: ServerId = raw_id.parse().map_err(|_| not_found(ctx, raw_id))?;
    store
        .get(&id)
        .filter(|record| ctx.can_see(&record.project_id))
        .ok_or_else(|| not_found(ctx, raw_id))
}

fn find_server_mut<'a>(
    store: &'a mut ServerStore,
    ctx: &RequestContext,
    raw_id: &str,
) -> Result<&'a mut ServerRecord, ApiError> {
    let id: ServerId = raw_id.parse().map_err(|_| not_found(ctx, raw_id))?;
    store
        .get_mut(&id)
        .filter(|record| ctx.can_see(&record.project_id))
        .ok_or_else(|| not_found(ctx, raw_id))
}
