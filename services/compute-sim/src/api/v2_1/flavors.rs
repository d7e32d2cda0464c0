use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use computest_id::FlavorId;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::api::response::ComputeResponse;
use crate::state::AppState;
use crate::view;

/// GET /v2.1/flavors/{flavor_id}
pub(super) async fn show_flavor(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(flavor_id): Path<String>,
) -> Result<ComputeResponse, ApiError> {
    let missing = || ctx.error(ApiError::not_found(format!("Flavor {flavor_id} could not be found.")));

    let id: FlavorId = flavor_id.parse().map_err(|_| missing())?;
    let spec = state.config().flavor(&id).ok_or_else(missing)?;

    let flavor = view::flavor(spec, ctx.microversion).map_err(|e| {
        ctx.error(ApiError::internal(format!("failed to render flavor: {e}")))
    })?;

    ComputeResponse::json(&ctx, StatusCode::OK, &json!({ "flavor": flavor }))
}
