//! Raw survey choice → presentation category label.

use crate::error::AnalyticsError;
use crate::variable::{Normalisation, VariableKey};

/// Map a raw choice into the category label used for `key`'s buckets.
///
/// Yes/no variables compare the choice to `"yes"` ignoring case; every
/// other answer (including blanks and "Maybe") lands in the negative label.
pub fn normalise(key: VariableKey, raw_choice: &str) -> String {
    match key.normalisation() {
        Normalisation::Passthrough => raw_choice.to_string(),
        Normalisation::YesNo { positive, negative } => {
            if raw_choice.eq_ignore_ascii_case("yes") {
                positive.to_string()
            } else {
                negative.to_string()
            }
        }
    }
}

/// String-keyed entry point for callers that have not parsed the variable
/// name yet. Unknown names are an error, never a silent default.
pub fn normalise_named(key: &str, raw_choice: &str) -> Result<String, AnalyticsError> {
    let key: VariableKey = key.parse()?;
    Ok(normalise(key, raw_choice))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_and_no_differ_for_every_yes_no_key() {
        for key in VariableKey::ALL {
            if key == VariableKey::Gender {
                continue;
            }
            assert_ne!(normalise(key, "Yes"), normalise(key, "No"), "{key}");
        }
    }

    #[test]
    fn test_gender_passes_through() {
        assert_eq!(normalise(VariableKey::Gender, "Male"), "Male");
        assert_eq!(normalise(VariableKey::Gender, "female"), "female");
    }

    #[test]
    fn test_labels() {
        assert_eq!(normalise(VariableKey::Age, "YES"), "Above 35");
        assert_eq!(normalise(VariableKey::Age, "no"), "Below 35");
        assert_eq!(normalise(VariableKey::Season, "yes"), "Rainy Season");
        assert_eq!(normalise(VariableKey::Season, "No"), "Dry Season");
        assert_eq!(normalise(VariableKey::FamilySize, "Yes"), "More than four");
        assert_eq!(normalise(VariableKey::FamilySize, "No"), "Four or less");
        assert_eq!(normalise(VariableKey::Location, "Yes"), "Bariga, Lagos");
        assert_eq!(normalise(VariableKey::Location, "No"), "Other location");
        assert_eq!(normalise(VariableKey::WeatherImpact, "Yes"), "Yes");
        assert_eq!(normalise(VariableKey::WeatherImpact, "No"), "No");
    }

    #[test]
    fn test_non_yes_answers_are_negative() {
        assert_eq!(normalise(VariableKey::MalariaIncrease, "Maybe"), "No");
        assert_eq!(normalise(VariableKey::MalariaIncrease, ""), "No");
        assert_eq!(normalise(VariableKey::MalariaIncrease, " yes "), "No");
    }

    #[test]
    fn test_named_entry_point() {
        assert_eq!(normalise_named("age", "Yes").unwrap(), "Above 35");
        assert_eq!(
            normalise_named("income", "Yes"),
            Err(AnalyticsError::UnknownVariable("income".into()))
        );
    }
}
