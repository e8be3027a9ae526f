//! Artifact category table loading and name matching from categories.toml.

use crate::error::CategoryError;
use glob::Pattern;
use serde::Deserialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// How a category locates its artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    DirectoryName,     // Directories with a matching name, at any depth
    FileGlob,          // Regular files whose name matches a glob, at any depth
    FixedRelativePath, // One known path directly under the sweep root
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchKind::DirectoryName => "directory-name",
            MatchKind::FileGlob => "file-glob",
            MatchKind::FixedRelativePath => "fixed-relative-path",
        };
        f.write_str(name)
    }
}

/// A validated, ready-to-apply category
#[derive(Debug, Clone)]
pub struct ArtifactCategory {
    pub label: String,
    pub kind: MatchKind,
    pub pattern: String,
    /// Compiled name matcher; `None` for fixed-relative-path categories
    matcher: Option<Pattern>,
}

/// Structure to deserialize the category table from TOML
#[derive(Debug, Deserialize)]
struct CategoryTable {
    #[serde(default, rename = "category")]
    categories: Vec<CategoryConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoryConfig {
    label: String,
    kind: MatchKind,
    pattern: String,
}

// Embed the TOML file directly in the binary at compile time
const CATEGORIES_TOML: &str = include_str!("../categories.toml");

impl ArtifactCategory {
    pub fn new(
        label: impl Into<String>,
        kind: MatchKind,
        pattern: impl Into<String>,
    ) -> Result<Self, CategoryError> {
        let label = label.into();
        let pattern = pattern.into();

        if label.trim().is_empty() {
            return Err(CategoryError::Invalid {
                label,
                reason: "label is empty".to_string(),
            });
        }
        if pattern.is_empty() {
            return Err(invalid(&label, "pattern is empty"));
        }

        let matcher = match kind {
            MatchKind::DirectoryName | MatchKind::FileGlob => {
                if pattern.contains('/') || pattern.contains('\\') {
                    return Err(invalid(
                        &label,
                        "name patterns must not contain path separators",
                    ));
                }
                let compiled = Pattern::new(&pattern).map_err(|source| CategoryError::Glob {
                    label: label.clone(),
                    pattern: pattern.clone(),
                    source,
                })?;
                Some(compiled)
            }
            MatchKind::FixedRelativePath => {
                // Only plain names like ".pytest_cache" or "reports/.coverage";
                // nothing that could climb out of the sweep root
                let normal = Path::new(&pattern)
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)));
                if !normal {
                    return Err(invalid(
                        &label,
                        "fixed paths must be relative and must not contain '..'",
                    ));
                }
                None
            }
        };

        Ok(ArtifactCategory {
            label,
            kind,
            pattern,
            matcher,
        })
    }

    /// Does a directory or file name match this category's pattern?
    /// Always false for fixed-relative-path categories and for names that are not UTF-8.
    pub fn matches_name(&self, name: &std::ffi::OsStr) -> bool {
        match (&self.matcher, name.to_str()) {
            (Some(pattern), Some(name)) => pattern.matches(name),
            _ => false,
        }
    }

    /// Target of a fixed-relative-path category under `root`
    pub fn fixed_target(&self, root: &Path) -> Option<PathBuf> {
        match self.kind {
            MatchKind::FixedRelativePath => Some(root.join(&self.pattern)),
            _ => None,
        }
    }
}

fn invalid(label: &str, reason: &str) -> CategoryError {
    CategoryError::Invalid {
        label: label.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse and validate a category table, keeping declaration order
pub fn parse_categories(toml_text: &str) -> Result<Vec<ArtifactCategory>, CategoryError> {
    let table: CategoryTable = toml::from_str(toml_text)?;

    if table.categories.is_empty() {
        return Err(CategoryError::Empty);
    }

    table
        .categories
        .into_iter()
        .map(|c| ArtifactCategory::new(c.label, c.kind, c.pattern))
        .collect()
}

/// The built-in categories compiled into the binary
pub fn builtin_categories() -> Result<Vec<ArtifactCategory>, CategoryError> {
    parse_categories(CATEGORIES_TOML)
}
