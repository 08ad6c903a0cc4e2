//! Mined scenario data types

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A named group of scenario descriptions (a `describe` block)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioSection {
    /// Section label exactly as written in the source
    pub name: String,
    /// Case labels in first-discovery order, without duplicates
    pub scenarios: Vec<String>,
}

impl ScenarioSection {
    /// Create an empty section
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenarios: Vec::new(),
        }
    }

    /// Add a scenario unless an identical one is already present
    ///
    /// Returns whether the scenario was new.
    pub fn insert(&mut self, scenario: impl Into<String>) -> bool {
        let scenario = scenario.into();
        if self.scenarios.contains(&scenario) {
            return false;
        }
        self.scenarios.push(scenario);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

/// Canonical identity of an implementation file
///
/// Holds a lexically normalized absolute path using `/` separators, so two
/// identities are equal exactly when their strings are.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TargetIdentity(String);

impl TargetIdentity {
    /// Only the resolver creates identities, after confirming the file exists
    pub(crate) fn new(normalized: String) -> Self {
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Merged scenarios per implementation file
pub type ScenarioMap = BTreeMap<TargetIdentity, Vec<ScenarioSection>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_collapses_duplicates() {
        let mut section = ScenarioSection::new("Foo");
        assert!(section.insert("bar"));
        assert!(section.insert("baz"));
        assert!(!section.insert("bar"));
        assert_eq!(section.scenarios, vec!["bar", "baz"]);
    }

    #[test]
    fn test_identity_serializes_as_string() {
        let id = TargetIdentity::new("/project/src/a.ts".to_string());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"/project/src/a.ts\"");
        assert_eq!(id.to_string(), "/project/src/a.ts");
    }
}
