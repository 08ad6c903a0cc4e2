//! Mining session
//!
//! Ties discovery, extraction, resolution and aggregation together. A session
//! owns its cache for its whole lifetime; nothing is shared between sessions.

use std::path::{Path, PathBuf};

use super::aggregator::ScenarioAggregator;
use super::cache::SectionCache;
use super::resolver::TargetResolver;
use super::types::{ScenarioMap, TargetIdentity};
use crate::common::config::MiningConfig;

/// One mining run over a set of test files
#[derive(Debug)]
pub struct MiningSession {
    resolver: TargetResolver,
    cache: SectionCache,
}

impl MiningSession {
    pub fn new(resolver: TargetResolver, cache: SectionCache) -> Self {
        Self { resolver, cache }
    }

    pub fn resolver(&self) -> &TargetResolver {
        &self.resolver
    }

    pub fn cache(&self) -> &SectionCache {
        &self.cache
    }

    /// Hand the cache back, e.g. to seed a later session
    pub fn into_cache(self) -> SectionCache {
        self.cache
    }

    /// Mine `files` into merged scenarios per implementation file
    ///
    /// A file that cannot be read is skipped; it never stops the others.
    pub fn mine<P: AsRef<Path>>(&mut self, files: &[P]) -> ScenarioMap {
        let mut aggregator = ScenarioAggregator::new();

        for file in files {
            let file = file.as_ref();
            let mined = match self.cache.get_or_mine(file) {
                Ok(mined) => mined,
                Err(e) => {
                    tracing::warn!(file = %file.display(), error = %e, "Skipping unreadable test file");
                    continue;
                }
            };

            let mut targets: Vec<TargetIdentity> = Vec::new();
            for dependency in &mined.imports {
                if let Some(target) = self.resolver.resolve(file, dependency) {
                    if !targets.contains(&target) {
                        targets.push(target);
                    }
                }
            }

            tracing::debug!(
                file = %file.display(),
                sections = mined.sections.len(),
                targets = targets.len(),
                "Mined test file"
            );

            for target in targets {
                aggregator.add(target, mined.sections.clone());
            }
        }

        let map = aggregator.finish();
        tracing::info!(
            files = files.len(),
            targets = map.len(),
            cache_hits = self.cache.hits(),
            "Mining finished"
        );
        map
    }
}

/// Find test files under the configured test directories of `project_root`
///
/// Missing directories contribute nothing. The result is sorted.
pub fn discover_test_files(project_root: &Path, config: &MiningConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for dir in &config.test_dirs {
        collect_test_files(&project_root.join(dir), config, &mut files);
    }
    files.sort();
    files.dedup();
    files
}

/// Collect test files from a file or directory path
pub fn collect_test_files(path: &Path, config: &MiningConfig, out: &mut Vec<PathBuf>) {
    if path.is_file() {
        if is_test_file(path, config) {
            out.push(path.to_path_buf());
        }
        return;
    }

    let Ok(entries) = std::fs::read_dir(path) else {
        tracing::debug!(dir = %path.display(), "Test directory not readable");
        return;
    };

    for entry in entries.flatten() {
        let entry_path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if entry_path.is_dir() {
            if name.starts_with('.') || config.ignore_dirs.iter().any(|d| d == name.as_ref()) {
                continue;
            }
            collect_test_files(&entry_path, config, out);
        } else if is_test_file(&entry_path, config) {
            out.push(entry_path);
        }
    }
}

fn is_test_file(path: &Path, config: &MiningConfig) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| config.test_suffixes.iter().any(|s| name.ends_with(s.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_discover_skips_ignored_dirs() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "src/__tests__/a.spec.ts", "");
        write(root, "src/__tests__/unit/b.test.tsx", "");
        write(root, "src/__tests__/helpers.ts", "");
        write(root, "src/__tests__/node_modules/c.spec.ts", "");
        write(root, "src/__tests__/.cache/d.spec.ts", "");

        let files = discover_test_files(root, &MiningConfig::default());
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.spec.ts", "b.test.tsx"]);
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        assert!(discover_test_files(dir.path(), &MiningConfig::default()).is_empty());
    }

    #[test]
    fn test_mine_skips_unreadable_and_external() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "src/utils/add.ts", "export const add = 1");
        let test_file = write(
            root,
            "src/__tests__/add.spec.ts",
            "import { it } from 'vitest'\nimport { add } from '../utils/add'\n\
             describe('add', () => { it('adds') })",
        );
        let missing = root.join("src/__tests__/gone.spec.ts");

        let config = MiningConfig::default();
        let mut session = MiningSession::new(TargetResolver::new(root, &config), SectionCache::new());
        let map = session.mine(&[test_file, missing]);

        assert_eq!(map.len(), 1);
        let (target, sections) = map.iter().next().unwrap();
        assert!(target.as_str().ends_with("/src/utils/add.ts"));
        assert_eq!(sections[0].scenarios, vec!["adds"]);
    }

    #[test]
    fn test_cache_survives_into_next_session() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "src/a.ts", "");
        let test_file = write(root, "src/a.spec.ts", "import { a } from './a'\ndescribe('a', () => { it('x') })");

        let config = MiningConfig::default();
        let mut first = MiningSession::new(TargetResolver::new(root, &config), SectionCache::new());
        let before = first.mine(&[&test_file]);

        let mut second = MiningSession::new(TargetResolver::new(root, &config), first.into_cache());
        let after = second.mine(&[&test_file]);

        assert_eq!(before, after);
        assert_eq!(second.cache().hits(), 1);
    }
}
