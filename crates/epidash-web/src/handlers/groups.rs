//! Raw answers grouped by disease.

use axum::extract::State;
use axum::Json;
use epidash_db::GroupedResponses;

use crate::error::ApiError;
use crate::state::SharedState;

/// GET /api/diseases-groups
pub async fn diseases_groups(
    State(state): State<SharedState>,
) -> Result<Json<GroupedResponses>, ApiError> {
    let groups = state.responses.grouped_responses().await?;
    Ok(Json(groups))
}
