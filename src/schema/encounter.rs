use serde::{Deserialize, Serialize};
use std::path::Path;

use super::story::StoryError;

/// Seed for a freeform side-encounter: the situation the oracle expands
/// on, and the condition under which the encounter is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Encounter {
    pub situation: String,
    pub end_condition: String,
}

impl Encounter {
    pub fn new(situation: impl Into<String>, end_condition: impl Into<String>) -> Self {
        Self {
            situation: situation.into(),
            end_condition: end_condition.into(),
        }
    }

    /// Parse a list of encounters from RON.
    pub fn parse_all(input: &str) -> Result<Vec<Encounter>, StoryError> {
        Ok(ron::from_str(input)?)
    }

    /// Load a list of encounters from a RON file.
    pub fn load_all(path: &Path) -> Result<Vec<Encounter>, StoryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_all(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_encounter_list() {
        let encounters = Encounter::parse_all(
            r#"[
                (
                    situation: "A stray dog follows you through the market.",
                    end_condition: "The dog leaves or joins you.",
                ),
                (situation: "Rain floods the underpass.", end_condition: "You reach dry ground."),
            ]"#,
        )
        .unwrap();
        assert_eq!(encounters.len(), 2);
        assert_eq!(encounters[1].end_condition, "You reach dry ground.");
    }

    #[test]
    fn missing_end_condition_is_rejected() {
        assert!(Encounter::parse_all(r#"[(situation: "alone")]"#).is_err());
    }

    #[test]
    fn empty_list_is_fine() {
        assert!(Encounter::parse_all("[]").unwrap().is_empty());
    }
}
