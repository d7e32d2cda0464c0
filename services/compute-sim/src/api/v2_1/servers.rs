//! Server CRUD and listing.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use computest_model::server::{ServerEnvelope, ServersEnvelope};
use computest_model::{
    CreateServerBody, ListServersQuery, Microversion, Networks, Server, ServerStatus,
    UpdateServerBody,
};
use rand::distr::Alphanumeric;
use rand::Rng;
use tokio::time::Instant;
use tracing::{info, warn};

use super::{find_server, find_server_mut, parse_body};
use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::api::response::ComputeResponse;
use crate::state::AppState;
use crate::store::{NewServer, ServerRecord, ServerStore};
use crate::view::{self, ViewOptions};

pub(super) fn admin_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

/// Full representation for show and list, as seen by this caller.
pub(super) fn render(state: &AppState, ctx: &RequestContext, record: &ServerRecord) -> Server {
    render_with(state, ctx, record, true)
}

/// Representation returned by update and rebuild: full from 2.75, short
/// before.
pub(super) fn render_mutation(
    state: &AppState,
    ctx: &RequestContext,
    record: &ServerRecord,
) -> Server {
    let extended =
        ctx.microversion >= Microversion::V2_75 && !state.config().faults.short_update_body;
    render_with(state, ctx, record, extended)
}

fn render_with(
    state: &AppState,
    ctx: &RequestContext,
    record: &ServerRecord,
    extended: bool,
) -> Server {
    let mut server = view::server_detail(
        record,
        state.config(),
        ViewOptions {
            microversion: ctx.microversion,
            admin: ctx.admin,
            extended,
        },
    );
    if state.config().faults.report_caller_tenant {
        server.tenant_id = ctx.project_id.clone();
    }
    server
}

/// Create a server.
///
/// POST /v2.1/servers
pub(super) async fn create_server(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Bytes,
) -> Result<ComputeResponse, ApiError> {
    let body: CreateServerBody = parse_body(&ctx, &body)?;
    let request = body.server;
    let config = state.config();

    if request.name.trim().is_empty() {
        return Err(ctx.error(ApiError::bad_request(
            "Invalid input for field/attribute name. Value: ''.",
        )));
    }

    if !config.has_image(&request.image_ref) {
        return Err(ctx.error(ApiError::bad_request(format!(
            "Image {} could not be found.",
            request.image_ref
        ))));
    }

    if config.flavor(&request.flavor_ref).is_none() {
        return Err(ctx.error(ApiError::bad_request(format!(
            "Flavor {} could not be found.",
            request.flavor_ref
        ))));
    }

    let networked = match (&request.networks, ctx.microversion >= Microversion::V2_37) {
        (None, true) => {
            return Err(ctx.error(ApiError::bad_request(
                "Invalid input for field/attribute server. 'networks' is a required property",
            )))
        }
        (Some(Networks::Auto | Networks::None), false) => {
            return Err(ctx.error(ApiError::bad_request(format!(
                "Invalid input for field/attribute networks. Requested at {} but only \
                 supported from {}.",
                ctx.microversion,
                Microversion::V2_37
            ))))
        }
        (Some(Networks::None), true) => false,
        _ => true,
    };

    let hints = body.scheduler_hints.unwrap_or_default();
    let now = Instant::now();
    let mut store = state.store().lock().await;
    store.settle(now);

    let host = match state.placement().select(&config.hosts, &hints, &store) {
        Ok(host) => Some(host),
        Err(e) => {
            warn!(request_id = %ctx.request_id, error = %e, "server will go to ERROR");
            None
        }
    };

    let index = store.next_index();
    let record = ServerRecord::building(
        NewServer {
            name: request.name,
            project_id: ctx.project_id.clone(),
            user_id: ctx.user_id.clone(),
            image_id: request.image_ref,
            flavor_id: request.flavor_ref,
            host,
            networked,
            metadata: request.metadata,
        },
        index,
        now,
        config.build_time,
    );

    info!(
        request_id = %ctx.request_id,
        server_id = %record.id,
        host = record.host.as_deref().unwrap_or("-"),
        "server accepted"
    );

    let response = ServerEnvelope {
        server: view::created_server(&record, admin_password()),
    };
    store.insert(record);

    ComputeResponse::json(&ctx, StatusCode::ACCEPTED, &response)
}

/// Applies list filters. Scoping rules:
///
/// - without `all_tenants` only the caller's project is listed, and
///   `tenant_id` is ignored;
/// - with `all_tenants` (admin only) every project is listed, narrowed by
///   `tenant_id` if given;
/// - `host` is honored for admins only.
fn filter_servers<'a>(
    state: &AppState,
    ctx: &RequestContext,
    query: &ListServersQuery,
    store: &'a ServerStore,
) -> Result<Vec<&'a ServerRecord>, ApiError> {
    let faults = state.config().faults;

    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<ServerStatus>() {
            Ok(status) => Some(status),
            Err(_) if faults.ignore_invalid_status => None,
            Err(_) if ctx.microversion >= Microversion::V2_38 => {
                return Err(ctx.error(ApiError::bad_request(format!(
                    "Invalid status value: {raw}"
                ))))
            }
            Err(_) => return Ok(Vec::new()),
        },
    };

    let all_tenants = if ctx.admin {
        query
            .all_tenants_flag()
            .map_err(|e| ctx.error(ApiError::bad_request(e.to_string())))?
    } else {
        false
    };

    let host = if ctx.admin { query.host.as_deref() } else { None };

    let records = store
        .newest_first()
        .into_iter()
        .filter(|r| {
            if all_tenants {
                query
                    .tenant_id
                    .as_deref()
                    .is_none_or(|tenant| r.project_id == tenant)
            } else {
                faults.ignore_tenant_scope || r.project_id == ctx.project_id
            }
        })
        .filter(|r| status.is_none_or(|s| r.status == s))
        .filter(|r| host.is_none_or(|h| r.host.as_deref() == Some(h)))
        .filter(|r| query.image.as_deref().is_none_or(|i| r.image_id == i))
        .filter(|r| query.flavor.as_deref().is_none_or(|f| r.flavor_id == f))
        .filter(|r| query.name.as_deref().is_none_or(|n| r.name.contains(n)))
        .collect();

    Ok(records)
}

/// List servers (brief).
///
/// GET /v2.1/servers
pub(super) async fn list_servers(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ListServersQuery>,
) -> Result<ComputeResponse, ApiError> {
    let mut store = state.store().lock().await;
    store.settle(Instant::now());

    let servers = filter_servers(&state, &ctx, &query, &store)?
        .into_iter()
        .map(view::server_summary)
        .collect();

    ComputeResponse::json(
        &ctx,
        StatusCode::OK,
        &ServersEnvelope {
            servers,
            links: Vec::new(),
        },
    )
}

/// List servers (detailed).
///
/// GET /v2.1/servers/detail
pub(super) async fn list_servers_detail(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ListServersQuery>,
) -> Result<ComputeResponse, ApiError> {
    let mut store = state.store().lock().await;
    store.settle(Instant::now());

    let servers = filter_servers(&state, &ctx, &query, &store)?
        .into_iter()
        .map(|record| render(&state, &ctx, record))
        .collect();

    ComputeResponse::json(
        &ctx,
        StatusCode::OK,
        &ServersEnvelope {
            servers,
            links: Vec::new(),
        },
    )
}

/// GET /v2.1/servers/{server_id}
pub(super) async fn show_server(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(server_id): Path<String>,
) -> Result<ComputeResponse, ApiError> {
    let mut store = state.store().lock().await;
    store.settle(Instant::now());

    let record = find_server(&store, &ctx, &server_id)?;
    let server = render(&state, &ctx, record);
    ComputeResponse::json(&ctx, StatusCode::OK, &ServerEnvelope { server })
}

/// PUT /v2.1/servers/{server_id}
pub(super) async fn update_server(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(server_id): Path<String>,
    body: Bytes,
) -> Result<ComputeResponse, ApiError> {
    let body: UpdateServerBody = parse_body(&ctx, &body)?;

    if body.server.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ctx.error(ApiError::bad_request(
            "Invalid input for field/attribute name. Value: ''.",
        )));
    }

    let mut store = state.store().lock().await;
    store.settle(Instant::now());

    let record = find_server_mut(&mut store, &ctx, &server_id)?;
    if let Some(name) = body.server.name {
        record.name = name;
        record.updated = chrono::Utc::now();
    }

    info!(request_id = %ctx.request_id, server_id = %record.id, "server updated");

    let server = render_mutation(&state, &ctx, record);
    ComputeResponse::json(&ctx, StatusCode::OK, &ServerEnvelope { server })
}

/// DELETE /v2.1/servers/{server_id}
pub(super) async fn delete_server(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(server_id): Path<String>,
) -> Result<ComputeResponse, ApiError> {
    let now = Instant::now();
    let delete_time = state.config().delete_time;
    let mut store = state.store().lock().await;
    store.settle(now);

    let record = find_server_mut(&mut store, &ctx, &server_id)?;
    if !record.is_deleting() {
        record.delete(now, delete_time);
        info!(request_id = %ctx.request_id, server_id = %record.id, "server deleting");
    }

    Ok(ComputeResponse::empty(&ctx, StatusCode::NO_CONTENT))
}
