//! End-to-end: model reply → data request → aggregation → chart payload.

use epidash_analytics::{
    aggregate_json, parse_data_requests, AggregationFilter, ChartData, ChartType, VariableKey,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn survey_rows() -> serde_json::Value {
    json!([
        {"disease_name": "Malaria", "question_text": "Are you older than 35?", "choice_text": "Yes", "response_count": 5},
        {"disease_name": "Malaria", "question_text": "Are you older than 35?", "choice_text": "No", "response_count": 3},
        {"disease_name": "Malaria", "question_text": "Are you male or female?", "choice_text": "Female", "response_count": 6},
        {"disease_name": "Malaria", "question_text": "Unrelated question", "choice_text": "Yes", "response_count": 9},
        {"disease_name": "Cholera", "question_text": "Is it the rainy season?", "choice_text": "Yes", "response_count": 4},
        {"disease_name": null, "question_text": "Is it the rainy season?", "choice_text": "Yes", "response_count": 4}
    ])
}

#[test]
fn reply_to_chart() {
    let reply = "```json\n{\"diseases\":[\"Malaria\",\"heat stress\"],\"variables\":[\"age\"],\"chartTypes\":[\"pie\"],\"title\":\"Age among malaria respondents\"}\n```";
    let requests = parse_data_requests(reply);
    assert_eq!(requests.len(), 1);

    let report = aggregate_json(&survey_rows(), &requests[0].filter()).unwrap();
    assert_eq!(
        serde_json::to_value(&report.result).unwrap(),
        json!({
            "malaria": {"age": {"Above 35": 5, "Below 35": 3}},
            "heat stress": {}
        })
    );
    assert_eq!(report.skipped.malformed, 1);
    assert_eq!(report.skipped.unclassified, 1);
    assert_eq!(report.skipped.filtered_variable, 1);
    assert_eq!(report.skipped.filtered_disease, 1);

    let chart = ChartData::build(&requests[0], report.into_result());
    assert_eq!(chart.chart_types, vec![ChartType::Pie]);
    assert_eq!(chart.title, "Age among malaria respondents");
}

#[test]
fn unfiltered_aggregation_covers_every_disease() {
    let report = aggregate_json(&survey_rows(), &AggregationFilter::default()).unwrap();
    let result = report.result;
    assert_eq!(result.keys().collect::<Vec<_>>(), vec!["cholera", "malaria"]);
    assert_eq!(result["cholera"][&VariableKey::Season]["Rainy Season"], 4);
    assert_eq!(result["malaria"][&VariableKey::Gender]["Female"], 6);
}
