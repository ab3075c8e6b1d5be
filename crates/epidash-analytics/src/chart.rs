//! Chart-ready payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::AggregationResult;
use crate::request::{ChartType, DataRequest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub id: Uuid,
    pub chart_types: Vec<ChartType>,
    pub title: String,
    pub data: AggregationResult,
    pub diseases: Vec<String>,
    pub variables: Vec<String>,
}

impl ChartData {
    /// Pair an aggregation with the request that produced it. Chart types
    /// fall back to a bar chart when the request named none.
    pub fn build(request: &DataRequest, data: AggregationResult) -> Self {
        let chart_types = if request.chart_types.is_empty() {
            vec![ChartType::default()]
        } else {
            request.chart_types.clone()
        };
        Self {
            id: Uuid::new_v4(),
            chart_types,
            title: request.display_title(),
            data,
            diseases: request.diseases.clone(),
            variables: request.variables.clone(),
        }
    }

    /// The first chart type is the one rendered by default.
    pub fn primary_chart_type(&self) -> ChartType {
        self.chart_types.first().copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, RawResponseRow};

    #[test]
    fn test_build_carries_request_metadata() {
        let request = DataRequest {
            diseases: vec!["malaria".into()],
            variables: vec!["age".into()],
            chart_types: vec![ChartType::Pie, ChartType::Bar],
            title: Some("Age split".into()),
        };
        let rows = vec![RawResponseRow::new("malaria", "Are you older than 35?", "Yes", 2)];
        let data = aggregate(&rows, &request.filter()).into_result();
        let chart = ChartData::build(&request, data);

        assert_eq!(chart.title, "Age split");
        assert_eq!(chart.primary_chart_type(), ChartType::Pie);
        assert_eq!(chart.diseases, vec!["malaria"]);
        assert_eq!(chart.data["malaria"].len(), 1);
    }

    #[test]
    fn test_empty_chart_types_fall_back_to_bar() {
        let request = DataRequest {
            diseases: vec![],
            variables: vec![],
            chart_types: vec![],
            title: None,
        };
        let chart = ChartData::build(&request, AggregationResult::new());
        assert_eq!(chart.chart_types, vec![ChartType::Bar]);
        assert_eq!(chart.title, "Survey data");
    }

    #[test]
    fn test_serialises_camel_case() {
        let request = DataRequest {
            diseases: vec!["cholera".into()],
            variables: vec![],
            chart_types: vec![ChartType::Line],
            title: Some("Cholera".into()),
        };
        let json = serde_json::to_value(ChartData::build(&request, AggregationResult::new())).unwrap();
        assert_eq!(json["chartTypes"], serde_json::json!(["line"]));
        assert!(json["id"].is_string());
    }

    #[test]
    fn test_ids_are_unique() {
        let request = DataRequest { diseases: vec![], variables: vec![], chart_types: vec![], title: None };
        let a = ChartData::build(&request, AggregationResult::new());
        let b = ChartData::build(&request, AggregationResult::new());
        assert_ne!(a.id, b.id);
    }
}
