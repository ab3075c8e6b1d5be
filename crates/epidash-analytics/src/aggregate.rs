//! Grouped response rows → nested `disease → variable → label → count`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::error::AnalyticsError;
use crate::filters::AggregationFilter;
use crate::normalise::normalise;
use crate::variable::VariableKey;

/// `disease (lowercase) → variable → category label → count`.
pub type AggregationResult = BTreeMap<String, BTreeMap<VariableKey, BTreeMap<String, u64>>>;

/// One row of the grouped analytics query. Every field is optional because
/// upstream data is not trusted; incomplete rows are skipped, not fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponseRow {
    pub disease_name: Option<String>,
    pub question_text: Option<String>,
    pub choice_text: Option<String>,
    pub response_count: Option<i64>,
}

impl RawResponseRow {
    pub fn new(
        disease_name: impl Into<String>,
        question_text: impl Into<String>,
        choice_text: impl Into<String>,
        response_count: i64,
    ) -> Self {
        Self {
            disease_name: Some(disease_name.into()),
            question_text: Some(question_text.into()),
            choice_text: Some(choice_text.into()),
            response_count: Some(response_count),
        }
    }

    /// Borrow the fields of a complete row. Empty strings and negative
    /// counts make a row incomplete.
    fn complete(&self) -> Option<(&str, &str, &str, u64)> {
        let disease = self.disease_name.as_deref().filter(|s| !s.is_empty())?;
        let question = self.question_text.as_deref().filter(|s| !s.is_empty())?;
        let choice = self.choice_text.as_deref().filter(|s| !s.is_empty())?;
        let count = u64::try_from(self.response_count?).ok()?;
        Some((disease, question, choice, count))
    }

    /// Read a row from a loosely-typed JSON object. Counts may arrive as
    /// numbers or numeric strings depending on the driver.
    fn from_json(index: usize, value: &Value) -> Result<Self, AnalyticsError> {
        let obj = value
            .as_object()
            .ok_or(AnalyticsError::RowNotAnObject { index })?;
        let text = |field: &str| obj.get(field).and_then(Value::as_str).map(str::to_string);
        let response_count = match obj.get("response_count") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        Ok(Self {
            disease_name: text("disease_name"),
            question_text: text("question_text"),
            choice_text: text("choice_text"),
            response_count,
        })
    }
}

/// Rows dropped during one aggregation, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipCounts {
    pub malformed: usize,
    pub unclassified: usize,
    pub filtered_variable: usize,
    pub filtered_disease: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.malformed + self.unclassified + self.filtered_variable + self.filtered_disease
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
    pub result: AggregationResult,
    pub skipped: SkipCounts,
}

impl AggregationReport {
    pub fn into_result(self) -> AggregationResult {
        self.result
    }
}

/// Aggregate grouped rows into nested counts.
///
/// Every disease named in `filter.diseases` is present in the result, with
/// an empty map when nothing matched. Bad rows are counted in
/// [`SkipCounts`] and never abort the batch. Sums saturate at `u64::MAX`.
pub fn aggregate(rows: &[RawResponseRow], filter: &AggregationFilter) -> AggregationReport {
    let mut result = AggregationResult::new();
    let mut skipped = SkipCounts::default();

    for (index, row) in rows.iter().enumerate() {
        let Some((disease, question, choice, count)) = row.complete() else {
            warn!(index, ?row, "Skipping malformed row");
            skipped.malformed += 1;
            continue;
        };

        let disease = disease.to_lowercase();
        let key = classify(question);

        if !filter.admits_disease(&disease) {
            debug!(index, disease = %disease, "disease not requested");
            skipped.filtered_disease += 1;
            continue;
        }

        let buckets = result.entry(disease).or_default();

        let Some(key) = key else {
            debug!(index, question, "question matches no variable");
            skipped.unclassified += 1;
            continue;
        };

        if !filter.admits_variable(key) {
            skipped.filtered_variable += 1;
            continue;
        }

        let total = buckets
            .entry(key)
            .or_default()
            .entry(normalise(key, choice))
            .or_insert(0);
        *total = total.saturating_add(count);
    }

    for disease in &filter.diseases {
        result.entry(disease.clone()).or_default();
    }

    if skipped.total() > 0 {
        debug!(
            rows = rows.len(),
            malformed = skipped.malformed,
            unclassified = skipped.unclassified,
            filtered_variable = skipped.filtered_variable,
            filtered_disease = skipped.filtered_disease,
            "aggregation skipped rows"
        );
    }

    AggregationReport { result, skipped }
}

/// Aggregate a JSON payload. The payload itself must be an array of
/// objects; anything else is a precondition failure.
pub fn aggregate_json(
    raw: &Value,
    filter: &AggregationFilter,
) -> Result<AggregationReport, AnalyticsError> {
    let items = raw.as_array().ok_or_else(|| AnalyticsError::NotASequence(kind(raw)))?;
    let rows = items
        .iter()
        .enumerate()
        .map(|(i, v)| RawResponseRow::from_json(i, v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(aggregate(&rows, filter))
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
