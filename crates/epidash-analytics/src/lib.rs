//! epidash-analytics: Survey aggregation core.
//!
//! Pipeline: raw grouped rows → [`classify`] question text into a
//! [`VariableKey`] → [`normalise`] the choice into a category label →
//! [`aggregate`] into `disease → variable → label → count`.
//!
//! Query intents coming back from the language model are parsed by
//! [`request`] and turned into chart payloads by [`chart`].

pub mod error;
pub mod variable;
pub mod classify;
pub mod normalise;
pub mod filters;
pub mod aggregate;
pub mod request;
pub mod chart;

pub use error::AnalyticsError;
pub use variable::{Normalisation, VariableKey};
pub use classify::classify;
pub use normalise::{normalise, normalise_named};
pub use filters::AggregationFilter;
pub use aggregate::{aggregate, aggregate_json, AggregationReport, AggregationResult, RawResponseRow, SkipCounts};
pub use request::{parse_data_requests, ChartType, DataRequest};
pub use chart::ChartData;
