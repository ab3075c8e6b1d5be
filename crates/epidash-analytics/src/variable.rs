//! The closed set of survey variables.
//!
//! Each variant owns exactly one question fragment (used by the classifier)
//! and one normalisation rule (used when bucketing choices). Adding a
//! variable means adding a variant here and nowhere else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableKey {
    Gender,
    Age,
    Season,
    FamilySize,
    ClimateChangeAwareness,
    Location,
    MalariaTreatmentLastYear,
    MalariaIncrease,
    WeatherImpact,
    PreventionTipsInterest,
}

/// How a raw choice becomes a category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalisation {
    /// Keep the raw choice as-is.
    Passthrough,
    /// `"yes"` (any case) maps to `positive`, anything else to `negative`.
    YesNo {
        positive: &'static str,
        negative: &'static str,
    },
}

impl VariableKey {
    /// Classification order. The first variant whose fragment matches wins.
    pub const ALL: [VariableKey; 10] = [
        VariableKey::Gender,
        VariableKey::Age,
        VariableKey::Season,
        VariableKey::FamilySize,
        VariableKey::ClimateChangeAwareness,
        VariableKey::Location,
        VariableKey::MalariaTreatmentLastYear,
        VariableKey::MalariaIncrease,
        VariableKey::WeatherImpact,
        VariableKey::PreventionTipsInterest,
    ];

    /// Lowercase phrase fragment that identifies this variable's question.
    pub fn fragment(self) -> &'static str {
        match self {
            Self::Gender => "male or female",
            Self::Age => "older than 35",
            Self::Season => "rainy season",
            Self::FamilySize => "more than four",
            Self::ClimateChangeAwareness => "climate change",
            Self::Location => "health facility",
            Self::MalariaTreatmentLastYear => "treated for malaria last year",
            Self::MalariaIncrease => "more last year than previous",
            Self::WeatherImpact => "weather conditions are affecting",
            Self::PreventionTipsInterest => "malaria prevention tips",
        }
    }

    pub fn normalisation(self) -> Normalisation {
        use Normalisation::{Passthrough, YesNo};
        match self {
            Self::Gender => Passthrough,
            Self::Age => YesNo { positive: "Above 35", negative: "Below 35" },
            Self::Season => YesNo { positive: "Rainy Season", negative: "Dry Season" },
            Self::FamilySize => YesNo { positive: "More than four", negative: "Four or less" },
            Self::Location => YesNo { positive: "Bariga, Lagos", negative: "Other location" },
            Self::ClimateChangeAwareness
            | Self::MalariaTreatmentLastYear
            | Self::MalariaIncrease
            | Self::WeatherImpact
            | Self::PreventionTipsInterest => YesNo { positive: "Yes", negative: "No" },
        }
    }

    /// Wire name, as used in query strings and JSON keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Age => "age",
            Self::Season => "season",
            Self::FamilySize => "familySize",
            Self::ClimateChangeAwareness => "climateChangeAwareness",
            Self::Location => "location",
            Self::MalariaTreatmentLastYear => "malariaTreatmentLastYear",
            Self::MalariaIncrease => "malariaIncrease",
            Self::WeatherImpact => "weatherImpact",
            Self::PreventionTipsInterest => "preventionTipsInterest",
        }
    }

    /// SQL `LIKE` pattern matching this variable's question text.
    pub fn like_pattern(self) -> String {
        format!("%{}%", self.fragment())
    }
}

impl fmt::Display for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableKey {
    type Err = AnalyticsError;

    /// Exact match on the wire name; variable names are case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AnalyticsError::UnknownVariable(s.to_string()))
    }
}
