//! `POST /servers/{id}/action`: os-resetState, rebuild, injectNetworkInfo.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use computest_model::request::ResetStateRequest;
use computest_model::server::ServerEnvelope;
use computest_model::{ImageRef, Link, RebuildRequest, ServerAction, ServerImage, ServerStatus};
use tokio::time::Instant;
use tracing::info;

use super::servers::{admin_password, render_mutation};
use super::{find_server, find_server_mut, parse_body};
use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::api::response::ComputeResponse;
use crate::state::AppState;

const REBUILDABLE: [ServerStatus; 3] = [
    ServerStatus::Active,
    ServerStatus::Shutoff,
    ServerStatus::Error,
];

pub(super) async fn server_action(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(server_id): Path<String>,
    body: Bytes,
) -> Result<ComputeResponse, ApiError> {
    let action: ServerAction = parse_body(&ctx, &body)?;
    info!(
        request_id = %ctx.request_id,
        server_id = %server_id,
        action = action.name(),
        "server action"
    );

    match action {
        ServerAction::ResetState(request) => reset_state(&state, &ctx, &server_id, request).await,
        ServerAction::Rebuild(request) => rebuild(&state, &ctx, &server_id, request).await,
        ServerAction::InjectNetworkInfo(()) => inject_network_info(&state, &ctx, &server_id).await,
    }
}

async fn reset_state(
    state: &AppState,
    ctx: &RequestContext,
    server_id: &str,
    request: ResetStateRequest,
) -> Result<ComputeResponse, ApiError> {
    ctx.require_admin("os_compute_api:os-admin-actions:reset_state")?;

    let mut store = state.store().lock().await;
    store.settle(Instant::now());

    let record = find_server_mut(&mut store, ctx, server_id)?;
    record.reset_state(request.state);

    Ok(ComputeResponse::empty(ctx, StatusCode::ACCEPTED))
}

async fn rebuild(
    state: &AppState,
    ctx: &RequestContext,
    server_id: &str,
    request: RebuildRequest,
) -> Result<ComputeResponse, ApiError> {
    let config = state.config();
    if !config.has_image(&request.image_ref) {
        return Err(ctx.error(ApiError::bad_request(format!(
            "Image {} could not be found.",
            request.image_ref
        ))));
    }

    let now = Instant::now();
    let mut store = state.store().lock().await;
    store.settle(now);

    let record = find_server_mut(&mut store, ctx, server_id)?;
    if record.is_deleting() || !REBUILDABLE.contains(&record.status) {
        return Err(ctx.error(ApiError::conflict(format!(
            "Cannot 'rebuild' instance {} while it is in vm_state {}",
            record.id,
            record.status.vm_state()
        ))));
    }

    if let Some(name) = request.name {
        record.name = name;
    }

    let target = if config.faults.keep_image_on_rebuild {
        record.image_id.clone()
    } else {
        request.image_ref.clone()
    };
    record.rebuild(target, now, config.rebuild_time, config.transient_rebuild_error);

    let mut server = render_mutation(state, ctx, record);
    server.image = ServerImage::Image(ImageRef {
        id: request.image_ref.clone(),
        links: vec![Link::new(format!("/images/{}", request.image_ref), "bookmark")],
    });
    server.admin_pass = Some(request.admin_pass.unwrap_or_else(admin_password));

    ComputeResponse::json(ctx, StatusCode::ACCEPTED, &ServerEnvelope { server })
}

async fn inject_network_info(
    state: &AppState,
    ctx: &RequestContext,
    server_id: &str,
) -> Result<ComputeResponse, ApiError> {
    ctx.require_admin("os_compute_api:os-admin-actions:inject_network_info")?;

    let mut store = state.store().lock().await;
    store.settle(Instant::now());
    find_server(&store, ctx, server_id)?;

    Ok(ComputeResponse::empty(ctx, StatusCode::ACCEPTED))
}
