//! Migration plan: which legacy items become which documents.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use syskit_common_fs::{self as fs, FsError};
use syskit_doc::{DocId, DocKind};

/// Plan shipped with the binary.
pub const BUILTIN_PLAN: &str = include_str!("../data/migration.yaml");

/// Complete mapping from legacy speckit items to syskit documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationPlan {
    #[serde(default)]
    pub features: Vec<FeaturePlan>,
    #[serde(default)]
    pub non_functional: Vec<PlannedDoc>,
    #[serde(default)]
    pub contracts: Vec<ContractPlan>,
    #[serde(default)]
    pub external_interfaces: Vec<ExternalInterfacePlan>,
    #[serde(default)]
    pub components: Vec<ComponentPlan>,
}

/// One legacy feature directory (`specs/<key>/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeaturePlan {
    pub key: String,
    #[serde(default)]
    pub user_stories: Vec<StoryMapping>,
    #[serde(default)]
    pub functional: Vec<FunctionalMapping>,
    /// Research notes to mine for design decisions, relative to the specs directory.
    #[serde(default)]
    pub research: Option<PathBuf>,
}

impl FeaturePlan {
    /// `specs/<key>/spec.md` relative to the specs directory.
    pub fn spec_file(&self) -> PathBuf {
        Path::new(&self.key).join("spec.md")
    }

    /// Mapping for a story id such as `US-3`.
    pub fn story(&self, story: &str) -> Option<&StoryMapping> {
        self.user_stories.iter().find(|m| m.story == story)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryMapping {
    pub story: String,
    pub id: DocId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionalMapping {
    pub item: String,
    pub id: DocId,
    pub title: String,
}

/// A document generated without a legacy source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannedDoc {
    pub id: DocId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractPlan {
    /// Contract file, relative to the specs directory.
    pub path: PathBuf,
    pub id: DocId,
    pub title: String,
    #[serde(rename = "type")]
    pub interface_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalInterfacePlan {
    pub id: DocId,
    pub title: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentPlan {
    pub name: String,
    pub units: Vec<UnitPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitPlan {
    pub id: DocId,
    pub title: String,
    /// Implementation file reference, optionally `path:symbol`.
    pub file: String,
    pub purpose: String,
}

impl MigrationPlan {
    /// The built-in plan.
    pub fn builtin() -> Result<Self, PlanError> {
        Self::from_yaml(BUILTIN_PLAN, "built-in migration plan")
    }

    /// Load a replacement plan file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let path = path.as_ref();
        let contents = fs::read_document(path)?;
        Self::from_yaml(&contents, &path.display().to_string())
    }

    /// The plan at `path` when given, else the built-in one.
    pub fn load(path: Option<&Path>) -> Result<Self, PlanError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    /// Parse and check a plan. `origin` names the source in errors.
    pub fn from_yaml(yaml: &str, origin: &str) -> Result<Self, PlanError> {
        let plan: Self = serde_yaml::from_str(yaml).map_err(|e| PlanError::Parse {
            origin: origin.to_string(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?;
        plan.check_kinds()?;
        Ok(plan)
    }

    fn check_kinds(&self) -> Result<(), PlanError> {
        let expect = |id: &DocId, kind: DocKind, section: &'static str| {
            if id.kind() == kind {
                Ok(())
            } else {
                Err(PlanError::WrongKind {
                    id: id.clone(),
                    expected: kind,
                    section,
                })
            }
        };

        for feature in &self.features {
            for m in &feature.user_stories {
                expect(&m.id, DocKind::Req, "user_stories")?;
            }
            for m in &feature.functional {
                expect(&m.id, DocKind::Req, "functional")?;
            }
        }
        for doc in &self.non_functional {
            expect(&doc.id, DocKind::Req, "non_functional")?;
        }
        for contract in &self.contracts {
            expect(&contract.id, DocKind::Int, "contracts")?;
        }
        for external in &self.external_interfaces {
            expect(&external.id, DocKind::Int, "external_interfaces")?;
        }
        for component in &self.components {
            for unit in &component.units {
                expect(&unit.id, DocKind::Unit, "components")?;
            }
        }
        Ok(())
    }

    /// REQ ids generated from user stories.
    pub fn user_story_ids(&self) -> BTreeSet<DocId> {
        self.features
            .iter()
            .flat_map(|f| f.user_stories.iter().map(|m| m.id.clone()))
            .collect()
    }

    /// INT ids generated from contract files.
    pub fn contract_ids(&self) -> BTreeSet<DocId> {
        self.contracts.iter().map(|c| c.id.clone()).collect()
    }

    /// Research files in feature order, relative to the specs directory.
    pub fn research_files(&self) -> impl Iterator<Item = &Path> {
        self.features.iter().filter_map(|f| f.research.as_deref())
    }
}

/// Migration plan errors.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Read(#[from] FsError),

    #[error("invalid migration plan {origin} at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    Parse {
        origin: String,
        line: Option<usize>,
        message: String,
    },

    #[error("{id} in {section} must be a {expected} id")]
    WrongKind {
        id: DocId,
        expected: DocKind,
        section: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_plan_loads() {
        let plan = MigrationPlan::builtin().unwrap();

        assert_eq!(plan.features.len(), 3);
        assert_eq!(plan.user_story_ids().len(), 25);
        assert_eq!(plan.contract_ids().len(), 7);
        assert_eq!(plan.external_interfaces.len(), 6);
        assert_eq!(plan.non_functional.len(), 3);
        let units: usize = plan.components.iter().map(|c| c.units.len()).sum();
        assert_eq!(units, 22);
        assert_eq!(plan.research_files().count(), 3);
    }

    #[test]
    fn test_builtin_plan_keeps_table_order_and_duplicates() {
        let plan = MigrationPlan::builtin().unwrap();
        let gpu = &plan.features[0];

        assert_eq!(gpu.key, "001-spi-gpu");
        assert_eq!(gpu.story("US-10").unwrap().id.to_string(), "REQ-010");
        let fr8 = gpu.functional.iter().find(|m| m.item == "FR-8").unwrap();
        assert_eq!(fr8.id.to_string(), "REQ-024");
        assert!(plan.features[2].functional.is_empty());
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let yaml = "non_functional:\n  - { id: INT-050, title: Oops }\n";
        match MigrationPlan::from_yaml(yaml, "test") {
            Err(PlanError::WrongKind { id, expected, .. }) => {
                assert_eq!(id.to_string(), "INT-050");
                assert_eq!(expected, DocKind::Req);
            }
            other => panic!("Expected WrongKind, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "features:\n  - key: x\n    stories: []\n";
        assert!(matches!(
            MigrationPlan::from_yaml(yaml, "test"),
            Err(PlanError::Parse { .. })
        ));
    }

    #[test]
    fn test_invalid_id_rejected() {
        let yaml = "non_functional:\n  - { id: REQ050, title: Oops }\n";
        assert!(matches!(
            MigrationPlan::from_yaml(yaml, "test"),
            Err(PlanError::Parse { .. })
        ));
    }
}
