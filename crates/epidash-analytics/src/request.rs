//! Data requests extracted from language-model replies.
//!
//! A reply may be bare JSON, JSON inside a ```json fence, or prose with a
//! JSON object somewhere in it. It may carry one request or an array of
//! them. Anything we cannot read as requests is treated as plain text.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::AnalyticsError;
use crate::filters::AggregationFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
}

impl ChartType {
    pub const ALL: [ChartType; 3] = [ChartType::Bar, ChartType::Line, ChartType::Pie];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AnalyticsError::UnknownChartType(s.to_string()))
    }
}

fn default_chart_types() -> Vec<ChartType> { vec![ChartType::Bar] }

/// What the user asked to see.
///
/// `variables` stays as raw strings here; [`DataRequest::filter`] validates
/// them against the closed variable set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRequest {
    pub diseases: Vec<String>,
    pub variables: Vec<String>,
    #[serde(default = "default_chart_types")]
    pub chart_types: Vec<ChartType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DataRequest {
    pub fn filter(&self) -> AggregationFilter {
        AggregationFilter::from_names(&self.diseases, &self.variables)
    }

    /// Title for display, falling back to the requested diseases.
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(t) if !t.trim().is_empty() => t.clone(),
            _ if self.diseases.is_empty() => "Survey data".to_string(),
            _ => format!("Survey data: {}", self.diseases.join(", ")),
        }
    }
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").unwrap())
}

/// Return the body of the first ``` fence, or the trimmed text when there
/// is none.
pub fn strip_code_fence(text: &str) -> &str {
    fence_regex()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_else(|| text.trim())
}

/// Outermost `{ … }` span, for replies that wrap JSON in prose.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn requests_from_json(text: &str) -> Option<Vec<DataRequest>> {
    let value: Value = serde_json::from_str(text).ok()?;
    match value {
        Value::Array(items) if !items.is_empty() => items
            .into_iter()
            .map(|item| serde_json::from_value(item).ok())
            .collect(),
        Value::Object(_) => serde_json::from_value(value).ok().map(|r| vec![r]),
        _ => None,
    }
}

/// Extract every data request from a model reply. An empty vector means
/// the reply is plain text.
pub fn parse_data_requests(reply: &str) -> Vec<DataRequest> {
    let candidates = [
        Some(reply.trim()),
        fence_regex()
            .captures(reply)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim()),
        brace_span(reply),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Some(requests) = requests_from_json(candidate) {
            debug!(count = requests.len(), "parsed data requests from reply");
            return requests;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::VariableKey;
    use pretty_assertions::assert_eq;

    fn malaria_age() -> DataRequest {
        DataRequest {
            diseases: vec!["malaria".into()],
            variables: vec!["age".into()],
            chart_types: vec![ChartType::Bar, ChartType::Pie],
            title: Some("Malaria by age".into()),
        }
    }

    #[test]
    fn test_parse_bare_object() {
        let reply = r#"{"diseases":["malaria"],"variables":["age"],"chartTypes":["bar","pie"],"title":"Malaria by age"}"#;
        assert_eq!(parse_data_requests(reply), vec![malaria_age()]);
    }

    #[test]
    fn test_parse_fenced_block() {
        let reply = "Here you go:\n```json\n{\"diseases\":[\"malaria\"],\"variables\":[\"age\"],\"chartTypes\":[\"bar\",\"pie\"],\"title\":\"Malaria by age\"}\n```\nEnjoy.";
        assert_eq!(parse_data_requests(reply), vec![malaria_age()]);
    }

    #[test]
    fn test_parse_object_inside_prose() {
        let reply = "Sure! {\"diseases\":[\"malaria\"],\"variables\":[\"age\"],\"chartTypes\":[\"bar\",\"pie\"],\"title\":\"Malaria by age\"} Let me know.";
        assert_eq!(parse_data_requests(reply), vec![malaria_age()]);
    }

    #[test]
    fn test_parse_array_of_requests() {
        let reply = r#"[
            {"diseases":["malaria"],"variables":["age"],"chartTypes":["bar","pie"],"title":"Malaria by age"},
            {"diseases":["cholera"],"variables":[],"chartTypes":["line"],"title":"Cholera"}
        ]"#;
        let parsed = parse_data_requests(reply);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].chart_types, vec![ChartType::Line]);
    }

    #[test]
    fn test_plain_text_yields_nothing() {
        assert!(parse_data_requests("Malaria is spread by mosquitoes.").is_empty());
        assert!(parse_data_requests("").is_empty());
        assert!(parse_data_requests("[]").is_empty());
    }

    #[test]
    fn test_unknown_chart_type_invalidates_request() {
        let reply = r#"{"diseases":["malaria"],"variables":["age"],"chartTypes":["scatter"],"title":"x"}"#;
        assert!(parse_data_requests(reply).is_empty());
    }

    #[test]
    fn test_missing_chart_types_default_to_bar() {
        let reply = r#"{"diseases":["cholera"],"variables":["season"]}"#;
        let parsed = parse_data_requests(reply);
        assert_eq!(parsed[0].chart_types, vec![ChartType::Bar]);
        assert_eq!(parsed[0].title, None);
    }

    #[test]
    fn test_mistyped_fields_are_rejected() {
        assert!(parse_data_requests(r#"{"diseases":"malaria","variables":[]}"#).is_empty());
        assert!(parse_data_requests(r#"{"variables":["age"]}"#).is_empty());
    }

    #[test]
    fn test_filter_validates_variables() {
        let req = DataRequest {
            diseases: vec!["Malaria".into()],
            variables: vec!["age".into(), "bogus".into()],
            chart_types: vec![ChartType::Bar],
            title: None,
        };
        let f = req.filter();
        assert!(f.diseases.contains("malaria"));
        assert_eq!(f.variables.into_iter().collect::<Vec<_>>(), vec![VariableKey::Age]);
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_chart_type_from_str() {
        assert_eq!("PIE".parse::<ChartType>().unwrap(), ChartType::Pie);
        assert!("radar".parse::<ChartType>().is_err());
    }

    #[test]
    fn test_display_title_fallback() {
        let mut req = malaria_age();
        assert_eq!(req.display_title(), "Malaria by age");
        req.title = None;
        assert_eq!(req.display_title(), "Survey data: malaria");
    }
}
