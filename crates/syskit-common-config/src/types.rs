//! Configuration types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyskitConfig {
    /// Corpus and source locations.
    pub paths: PathsConfig,
    /// Replacement mapping tables.
    pub tables: TablesConfig,
    /// Validator thresholds.
    pub validation: ValidationConfig,
    /// Migrator options.
    pub migration: MigrationConfig,
}

/// Directory layout, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Legacy speckit specifications.
    pub specs: PathBuf,
    /// Root of the generated syskit documents.
    pub docs: PathBuf,
    /// REQ documents, relative to `docs`.
    pub requirements: PathBuf,
    /// INT documents, relative to `docs`.
    pub interfaces: PathBuf,
    /// UNIT documents and design decisions, relative to `docs`.
    pub design: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            specs: PathBuf::from("specs"),
            docs: PathBuf::from("doc"),
            requirements: PathBuf::from("requirements"),
            interfaces: PathBuf::from("interfaces"),
            design: PathBuf::from("design"),
        }
    }
}

/// Optional YAML files replacing the built-in tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    /// Migration plan (legacy item to document mapping).
    pub migration: Option<PathBuf>,
    /// Traceability adjacency tables.
    pub traceability: Option<PathBuf>,
}

/// Validator thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Fewest documents the count check accepts.
    pub min_documents: usize,
    /// Document total reported as expected.
    pub expected_documents: usize,
    /// Issues shown per failing check in text output.
    pub max_listed_issues: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_documents: 90,
            expected_documents: 99,
            max_listed_issues: 10,
        }
    }
}

/// Migrator options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Date stamped on extracted decision records (`YYYY-MM-DD`); today when unset.
    pub adr_date: Option<String>,
    /// Sections taken from each research file.
    pub adrs_per_research_file: usize,
    /// Characters of section text kept as ADR context.
    pub adr_context_chars: usize,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            adr_date: None,
            adrs_per_research_file: 3,
            adr_context_chars: 500,
        }
    }
}

/// Absolute directories derived from a project root and [`PathsConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub specs_dir: PathBuf,
    pub docs_dir: PathBuf,
    pub requirements_dir: PathBuf,
    pub interfaces_dir: PathBuf,
    pub design_dir: PathBuf,
}

impl ProjectLayout {
    /// Resolve `paths` against `root`.
    pub fn new(root: impl AsRef<Path>, paths: &PathsConfig) -> Self {
        let root = root.as_ref().to_path_buf();
        let docs_dir = root.join(&paths.docs);
        Self {
            specs_dir: root.join(&paths.specs),
            requirements_dir: docs_dir.join(&paths.requirements),
            interfaces_dir: docs_dir.join(&paths.interfaces),
            design_dir: docs_dir.join(&paths.design),
            docs_dir,
            root,
        }
    }
}

impl SyskitConfig {
    /// Directory layout for a project rooted at `root`.
    pub fn layout(&self, root: impl AsRef<Path>) -> ProjectLayout {
        ProjectLayout::new(root, &self.paths)
    }
}
