//! Aggregation filters and query-parameter parsing.

use std::collections::BTreeSet;

use tracing::debug;

use crate::variable::VariableKey;

/// Split a comma-separated parameter, trimming entries and dropping blanks.
pub fn split_list(param: Option<&str>) -> Vec<String> {
    param
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Like [`split_list`], with each disease name lowercased.
pub fn split_diseases(param: Option<&str>) -> Vec<String> {
    split_list(param)
        .into_iter()
        .map(|d| d.to_lowercase())
        .collect()
}

/// Trimmed, lowercased disease names with blanks dropped.
fn normalise_diseases<I>(diseases: I) -> impl Iterator<Item = String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    diseases
        .into_iter()
        .map(|d| d.as_ref().trim().to_lowercase())
        .filter(|d| !d.is_empty())
}

/// Narrowing predicates applied while aggregating.
///
/// An empty set means "no restriction" for both fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationFilter {
    pub diseases: BTreeSet<String>,
    pub variables: BTreeSet<VariableKey>,
}

impl AggregationFilter {
    /// Build a filter from untrusted names. Diseases are trimmed and lowercased;
    /// variable names outside the closed set are dropped.
    pub fn from_names<D, V>(diseases: D, variables: V) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let diseases = normalise_diseases(diseases).collect();

        let variables = variables
            .into_iter()
            .filter_map(|v| {
                let name = v.as_ref().trim();
                match name.parse::<VariableKey>() {
                    Ok(key) => Some(key),
                    Err(_) => {
                        debug!(variable = name, "ignoring unknown variable");
                        None
                    }
                }
            })
            .collect();

        Self { diseases, variables }
    }

    /// Add diseases, normalised the same way as [`AggregationFilter::from_names`].
    pub fn with_diseases<I>(mut self, diseases: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.diseases.extend(normalise_diseases(diseases));
        self
    }

    pub fn with_variables<I>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = VariableKey>,
    {
        self.variables.extend(variables);
        self
    }

    /// `disease` must already be lowercased.
    pub fn admits_disease(&self, disease: &str) -> bool {
        self.diseases.is_empty() || self.diseases.contains(disease)
    }

    pub fn admits_variable(&self, key: VariableKey) -> bool {
        self.variables.is_empty() || self.variables.contains(&key)
    }
}
