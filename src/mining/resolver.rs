//! Dependency path resolution
//!
//! Maps an import string found in a test file to the implementation file it
//! names. Only relative (`./`, `../`) and aliased (`@/...`) imports are
//! considered; package imports never resolve.

use std::path::{Component, Path, PathBuf};

use super::types::TargetIdentity;
use crate::common::config::MiningConfig;

/// How a dependency string is interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyKind {
    /// Relative to the importing file's directory
    Relative,
    /// Relative to a project-root-relative base directory
    Alias { base: PathBuf, rest: String },
    /// A package reference, never resolved
    External,
}

/// Resolves dependency strings to implementation-file identities
#[derive(Debug, Clone)]
pub struct TargetResolver {
    project_root: PathBuf,
    /// (prefix, project-relative base), longest prefix first
    aliases: Vec<(String, PathBuf)>,
    extensions: Vec<String>,
}

impl TargetResolver {
    pub fn new(project_root: impl Into<PathBuf>, config: &MiningConfig) -> Self {
        let mut aliases: Vec<(String, PathBuf)> = config
            .aliases
            .iter()
            .map(|(prefix, base)| (prefix.clone(), PathBuf::from(base)))
            .collect();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            project_root: project_root.into(),
            aliases,
            extensions: config.extensions.clone(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Classify a dependency string
    pub fn classify(&self, dependency: &str) -> DependencyKind {
        if dependency == "."
            || dependency == ".."
            || dependency.starts_with("./")
            || dependency.starts_with("../")
        {
            return DependencyKind::Relative;
        }

        for (prefix, base) in &self.aliases {
            if let Some(rest) = dependency.strip_prefix(prefix.as_str()) {
                return DependencyKind::Alias {
                    base: base.clone(),
                    rest: rest.to_string(),
                };
            }
        }

        DependencyKind::External
    }

    /// Identity of an existing file, relative paths taken from the project root
    pub fn identify(&self, path: &Path) -> Option<TargetIdentity> {
        let path = if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.project_root.join(path))
        };
        path.is_file().then(|| TargetIdentity::new(to_slash(&path)))
    }

    /// Resolve `dependency` as written in the file at `origin`
    ///
    /// Returns `None` for package imports and for paths where no candidate
    /// file exists. Callers skip those.
    pub fn resolve(&self, origin: &Path, dependency: &str) -> Option<TargetIdentity> {
        let base = match self.classify(dependency) {
            DependencyKind::External => return None,
            DependencyKind::Relative => {
                let origin = if origin.is_absolute() {
                    origin.to_path_buf()
                } else {
                    self.project_root.join(origin)
                };
                origin.parent()?.join(dependency)
            }
            DependencyKind::Alias { base, rest } => self.project_root.join(base).join(rest),
        };
        let base = normalize(&base);

        for ext in &self.extensions {
            let mut candidate = base.clone().into_os_string();
            candidate.push(ext);

            if let Some(identity) = self.identify(Path::new(&candidate)) {
                tracing::debug!(dependency, identity = %identity, "Resolved dependency");
                return Some(identity);
            }
        }

        tracing::debug!(dependency, base = %base.display(), "Dependency did not resolve");
        None
    }
}

/// Lexically remove `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Render a path with `/` separators on every platform
fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
