//! `GET /api/data`: analytics, reference data, summary and dashboard Q&A.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use epidash_analytics::aggregate;
use epidash_analytics::filters::{split_diseases, split_list, AggregationFilter};
use epidash_db::Disease;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::cache::CacheKey;
use crate::error::ApiError;
use crate::state::SharedState;

pub const VALID_TYPES: &[&str] = &["analytics", "diseases", "questions", "summary", "general"];

#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub diseases: Option<String>,
    pub variables: Option<String>,
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_diseases: usize,
    pub total_responders: i64,
    pub total_responses: i64,
    pub diseases: Vec<SummaryDisease>,
    pub last_updated: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryDisease {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl From<Disease> for SummaryDisease {
    fn from(d: Disease) -> Self {
        Self {
            id: d.disease_id,
            name: d.disease_name,
            description: d.description,
            is_active: d.is_active,
        }
    }
}

/// GET /api/data?type=…
pub async fn data(
    State(state): State<SharedState>,
    Query(query): Query<DataQuery>,
) -> Result<Json<Value>, ApiError> {
    let kind = query.kind.as_deref().unwrap_or_default();
    debug!(kind, "data request");
    match kind {
        "analytics" => analytics(&state, &query).await,
        "diseases" => cached(&state, CacheKey::Diseases).await,
        "questions" => cached(&state, CacheKey::Questions).await,
        "summary" => cached(&state, CacheKey::Summary).await,
        "general" => general(&state, &query).await,
        _ => Err(ApiError::InvalidType { valid: VALID_TYPES }),
    }
}

async fn analytics(state: &SharedState, query: &DataQuery) -> Result<Json<Value>, ApiError> {
    let diseases = split_diseases(query.diseases.as_deref());
    if diseases.is_empty() {
        return Err(ApiError::bad_request(
            "Missing diseases",
            "At least one disease must be specified",
        ));
    }
    let variables = split_list(query.variables.as_deref());

    let filter = AggregationFilter::from_names(&diseases, &variables);
    let rows = state.responses.analytics_rows(&filter).await?;
    let report = aggregate(&rows, &filter);

    let meta_variables = if variables.is_empty() { json!("all") } else { json!(variables) };
    Ok(Json(json!({
        "success": true,
        "data": report.result,
        "meta": {
            "diseases": diseases,
            "variables": meta_variables,
            "skipped": report.skipped,
        }
    })))
}

async fn cached(state: &SharedState, key: CacheKey) -> Result<Json<Value>, ApiError> {
    let (data, was_cached) = state
        .cache
        .get_or_fetch(key, || fetch_reference(state, key))
        .await?;

    let mut body = json!({ "success": true, "data": data });
    if was_cached {
        body["cached"] = Value::Bool(true);
    }
    Ok(Json(body))
}

async fn fetch_reference(state: &SharedState, key: CacheKey) -> Result<Value, ApiError> {
    let value = match key {
        CacheKey::Diseases => serde_json::to_value(state.references.diseases().await?),
        CacheKey::Questions => serde_json::to_value(state.references.questions(None).await?),
        CacheKey::Summary => serde_json::to_value(summary(state).await?),
    };
    value.map_err(|e| ApiError::Internal(e.to_string()))
}

async fn summary(state: &SharedState) -> Result<Summary, ApiError> {
    let (diseases, total_responders, total_responses) = tokio::try_join!(
        state.references.diseases(),
        state.responses.responder_count(),
        state.responses.total_responses(),
    )?;
    Ok(Summary {
        total_diseases: diseases.len(),
        total_responders,
        total_responses,
        diseases: diseases.into_iter().map(SummaryDisease::from).collect(),
        last_updated: Utc::now().to_rfc3339(),
    })
}

async fn general(state: &SharedState, query: &DataQuery) -> Result<Json<Value>, ApiError> {
    let question = query
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            ApiError::bad_request(
                "Missing question",
                "A question must be provided via the `question` query parameter.",
            )
        })?;

    let reply = state.assistant.answer_dashboard(question).await?;
    Ok(Json(json!({ "success": true, "reply": reply })))
}
