//! Keyword heuristics over user messages.

const VISUALIZATION_KEYWORDS: &[&str] = &[
    "show", "display", "visualize", "graph", "chart",
    "plot", "correlation", "comparison", "trend",
    "bar", "line", "pie", "data", "analyze",
];

const DISEASE_KEYWORDS: &[&str] = &["malaria", "cholera", "heat stress", "disease"];

/// True when the message asks to see survey data: it names at least one
/// visualisation word and at least one disease word.
pub fn is_visualization_query(message: &str) -> bool {
    let text_lower = message.to_lowercase();
    let wants_visual = VISUALIZATION_KEYWORDS.iter().any(|k| text_lower.contains(k));
    let names_disease = DISEASE_KEYWORDS.iter().any(|k| text_lower.contains(k));
    wants_visual && names_disease
}
