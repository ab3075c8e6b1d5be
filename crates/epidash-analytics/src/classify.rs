//! Question text → survey variable.

use crate::variable::VariableKey;

/// Classify a survey question by case-insensitive substring match.
///
/// Variables are tried in [`VariableKey::ALL`] order and the first match
/// wins, so a question mentioning both "climate change" and "health
/// facility" is `climateChangeAwareness`.
pub fn classify(question_text: &str) -> Option<VariableKey> {
    let text_lower = question_text.to_lowercase();
    VariableKey::ALL
        .into_iter()
        .find(|key| text_lower.contains(key.fragment()))
}
