//! System prompts for the dashboard assistant.
//!
//! The variable and chart-type lists are generated from the analytics enums
//! so the model is never told about a variable the aggregator can't bucket.

use epidash_analytics::{ChartType, VariableKey};
use serde::{Deserialize, Serialize};

/// Facts about the deployment that every prompt mentions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardContext {
    pub region: String,
    pub diseases: Vec<String>,
}

impl Default for DashboardContext {
    fn default() -> Self {
        Self {
            region: "Bariga, Lagos".to_string(),
            diseases: vec!["malaria".into(), "cholera".into(), "heat stress".into()],
        }
    }
}

impl DashboardContext {
    fn disease_list(&self) -> String {
        self.diseases.join(", ")
    }
}

fn variable_list() -> String {
    VariableKey::ALL.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
}

fn variable_descriptions() -> String {
    VariableKey::ALL
        .iter()
        .map(|k| format!("- {} (questions mentioning \"{}\")", k.as_str(), k.fragment()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn chart_type_list() -> String {
    ChartType::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
}

/// Strict-JSON intent extraction.
pub fn intent_prompt(ctx: &DashboardContext) -> String {
    format!(
        "You extract chart requests for a disease survey dashboard.\n\
         Reply with a single JSON object and nothing else:\n\
         {{\"diseases\": [...], \"variables\": [...], \"chartTypes\": [...]}}\n\
         Rules:\n\
         1. diseases may only contain: {diseases}\n\
         2. variables may only contain: {variables}\n\
         3. chartTypes may only contain: {charts}\n\
         4. When no chart type is mentioned use [\"{default_chart}\"]\n\
         5. No prose, no markdown fences",
        diseases = ctx.disease_list(),
        variables = variable_list(),
        charts = chart_type_list(),
        default_chart = ChartType::default(),
    )
}

/// Factual health questions.
pub fn general_prompt(ctx: &DashboardContext) -> String {
    format!(
        "You are a medical information assistant focused on {diseases}.\n\
         Give clear, accurate answers about symptoms, prevention, treatment, \
         how climate and weather affect these diseases, and how to read survey data.\n\
         The dashboard holds survey responses collected in {region}, covering \
         age, gender, season and related questions.\n\
         Stay professional but approachable, and cite sources when you can.",
        diseases = ctx.disease_list(),
        region = ctx.region,
    )
}

/// Messages that look like chart requests but arrived without JSON mode.
pub fn guided_prompt(ctx: &DashboardContext) -> String {
    format!(
        "You help users of a disease survey dashboard phrase chart requests.\n\
         Diseases: {diseases}. Region: {region}.\n\
         Variables: {variables}.\n\
         Chart types: {charts} (default {default_chart}).\n\
         A good request names a disease, one or more variables and optionally a chart type, \
         for example \"Show malaria responses by age and gender as pie charts\".",
        diseases = ctx.disease_list(),
        region = ctx.region,
        variables = variable_list(),
        charts = chart_type_list(),
        default_chart = ChartType::default(),
    )
}

/// Free-form dashboard questions: chart JSON when data is asked for,
/// plain text otherwise.
pub fn dashboard_prompt(ctx: &DashboardContext) -> String {
    format!(
        "You answer questions for a disease survey dashboard in {region}.\n\
         Available diseases: {diseases}.\n\
         Valid variables:\n{variables}\n\n\
         If the question asks about a disease and one or more of these variables, reply with JSON only:\n\
         {{\"chartTypes\": [...], \"diseases\": [...], \"variables\": [...], \"title\": \"...\"}}\n\
         - chartTypes defaults to [\"{default_chart}\"]; use {charts} when the user names one\n\
         - if only variables are mentioned, include every available disease\n\
         - title describes what the chart shows\n\
         Several charts may be returned as a JSON array of such objects.\n\
         For anything else, answer in plain text.",
        region = ctx.region,
        diseases = ctx.disease_list(),
        variables = variable_descriptions(),
        default_chart = ChartType::default(),
        charts = chart_type_list(),
    )
}
