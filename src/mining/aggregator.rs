//! Merging of scenario sections across test files
//!
//! Several test files may exercise the same implementation file. Their
//! sections are grouped by label and the scenario sets are unioned, so the
//! result only depends on the set of contributions, never on their order.
//! Callers should still compare results as sets.

use std::collections::{BTreeMap, HashMap};

use super::types::{ScenarioMap, ScenarioSection, TargetIdentity};

/// Merge every contribution for one target into one section per label
///
/// Sections whose merged scenario set is empty are dropped.
pub fn aggregate<'a, I>(target: &TargetIdentity, sections_per_file: I) -> Vec<ScenarioSection>
where
    I: IntoIterator<Item = &'a [ScenarioSection]>,
{
    let mut merged: Vec<ScenarioSection> = Vec::new();
    let mut by_label: HashMap<&'a str, usize> = HashMap::new();
    let mut files = 0usize;

    for sections in sections_per_file {
        files += 1;
        for section in sections {
            let idx = *by_label.entry(section.name.as_str()).or_insert_with(|| {
                merged.push(ScenarioSection::new(section.name.clone()));
                merged.len() - 1
            });
            for scenario in &section.scenarios {
                merged[idx].insert(scenario.clone());
            }
        }
    }

    merged.retain(|section| !section.is_empty());
    tracing::debug!(
        identity = %target,
        files,
        sections = merged.len(),
        "Aggregated scenarios"
    );
    merged
}

/// Collects per-file sections keyed by target, then merges them once
#[derive(Debug, Default)]
pub struct ScenarioAggregator {
    contributions: BTreeMap<TargetIdentity, Vec<Vec<ScenarioSection>>>,
}

impl ScenarioAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the sections of one file as contributing to `target`
    pub fn add(&mut self, target: TargetIdentity, sections: Vec<ScenarioSection>) {
        self.contributions.entry(target).or_default().push(sections);
    }

    /// Merge all contributions; targets left without scenarios are omitted
    pub fn finish(self) -> ScenarioMap {
        self.contributions
            .into_iter()
            .filter_map(|(target, files)| {
                let merged = aggregate(&target, files.iter().map(Vec::as_slice));
                (!merged.is_empty()).then_some((target, merged))
            })
            .collect()
    }
}
