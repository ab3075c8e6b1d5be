//! `POST /api/ask`: a question in, chart payloads out.
//!
//! The assistant's reply is scanned for data requests; each one is run
//! through the analytics query and the aggregator. Replies without a data
//! request come back as plain text.

use axum::extract::State;
use axum::Json;
use epidash_analytics::{aggregate, parse_data_requests, ChartData};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub success: bool,
    pub charts: Vec<ChartData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

pub async fn ask(
    State(state): State<SharedState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let message = payload
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("Bad request", "Message is required"))?;

    let reply = state.assistant.answer_dashboard(message).await?;
    let requests = parse_data_requests(&reply);

    if requests.is_empty() {
        return Ok(Json(AskResponse { success: true, charts: vec![], reply: Some(reply), errors: vec![] }));
    }

    let mut charts = Vec::with_capacity(requests.len());
    let mut errors = Vec::new();
    for request in &requests {
        let filter = request.filter();
        match state.responses.analytics_rows(&filter).await {
            Ok(rows) => {
                let report = aggregate(&rows, &filter);
                let chart = ChartData::build(request, report.into_result());
                debug!(title = %chart.title, chart_type = %chart.primary_chart_type(), "built chart");
                charts.push(chart);
            }
            Err(e) => {
                warn!(error = %e, title = %request.display_title(), "chart data fetch failed");
                errors.push(format!("Failed to fetch data for: {}", request.display_title()));
            }
        }
    }

    info!(charts = charts.len(), failed = errors.len(), "answered dashboard question");
    Ok(Json(AskResponse { success: true, charts, reply: None, errors }))
}
