//! Generates REQ, INT and UNIT documents from the legacy speckit tree.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use syskit_common_config::{MigrationConfig, ProjectLayout};
use syskit_common_fs::{self as fs, path, FsError};
use syskit_doc::{DocId, FenceTracker, Markdown, ParseError, SectionBody};
use tracing::{debug, info, warn};

use crate::extract::{extract_user_stories, ExtractError};
use crate::plan::{FeaturePlan, MigrationPlan};
use crate::templates::{open_placeholder, trace_placeholder, DocRenderer, RenderError};

/// Design decision log, relative to the design directory.
pub const DECISIONS_FILE: &str = "design_decisions.md";

const DECISIONS_HEADER: &str = "# Architecture Decision Records\n\n";

static DECISION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^## DD-(\d+):\s*(.+?)\s*$").expect("decision heading pattern is valid")
});

/// Migration stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    UserStories,
    FunctionalRequirements,
    NonFunctionalRequirements,
    Contracts,
    ExternalInterfaces,
    Units,
    DesignDecisions,
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Self::UserStories => "user stories",
            Self::FunctionalRequirements => "functional requirements",
            Self::NonFunctionalRequirements => "non-functional requirements",
            Self::Contracts => "contracts",
            Self::ExternalInterfaces => "external interfaces",
            Self::Units => "design units",
            Self::DesignDecisions => "design decisions",
        }
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub created: usize,
    pub skipped: usize,
}

/// Outcome of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    pub steps: Vec<StepReport>,
    /// Files written, relative to the project root.
    pub written: Vec<String>,
    /// Skipped sources.
    pub warnings: Vec<String>,
}

impl MigrationSummary {
    /// Documents created across all steps, decision records excluded.
    pub fn documents_created(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.step != Step::DesignDecisions)
            .map(|s| s.created)
            .sum()
    }

    pub fn step(&self, step: Step) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step == step)
    }
}

#[derive(Serialize)]
struct UserStoryContext<'a> {
    id: &'a DocId,
    title: &'a str,
    priority: String,
    narrative: &'a str,
    verification: String,
    pending: &'a str,
}

#[derive(Serialize)]
struct RequirementContext<'a> {
    id: &'a DocId,
    title: &'a str,
    source: &'a str,
    pending: &'a str,
}

#[derive(Serialize)]
struct ContractContext<'a> {
    id: &'a DocId,
    title: &'a str,
    interface_type: &'a str,
    specification: &'a str,
    source: &'a str,
    pending: &'a str,
}

#[derive(Serialize)]
struct ExternalContext<'a> {
    id: &'a DocId,
    title: &'a str,
    reference: &'a str,
    pending: &'a str,
    open: &'a str,
}

#[derive(Serialize)]
struct UnitContext<'a> {
    id: &'a DocId,
    title: &'a str,
    purpose: &'a str,
    file: &'a str,
    component: &'a str,
    pending: &'a str,
    open: &'a str,
}

#[derive(Serialize)]
struct DecisionContext<'a> {
    number: String,
    title: &'a str,
    date: &'a str,
    context: String,
    source: &'a str,
    consequences: String,
}

/// Runs the migration steps in order.
pub struct Migrator<'a> {
    layout: &'a ProjectLayout,
    plan: &'a MigrationPlan,
    options: &'a MigrationConfig,
    renderer: DocRenderer,
    pending: String,
    open: String,
}

impl<'a> Migrator<'a> {
    pub fn new(
        layout: &'a ProjectLayout,
        plan: &'a MigrationPlan,
        options: &'a MigrationConfig,
    ) -> Result<Self, MigrateError> {
        Ok(Self {
            layout,
            plan,
            options,
            renderer: DocRenderer::new()?,
            pending: trace_placeholder(),
            open: open_placeholder(),
        })
    }

    /// Run every step. Missing sources are skipped with a warning; I/O
    /// failures abort.
    pub fn run(&self) -> Result<MigrationSummary, MigrateError> {
        for dir in [
            &self.layout.requirements_dir,
            &self.layout.interfaces_dir,
            &self.layout.design_dir,
        ] {
            fs::ensure_dir(dir)?;
        }

        let mut summary = MigrationSummary::default();
        self.migrate_user_stories(&mut summary)?;
        self.migrate_functional(&mut summary)?;
        self.migrate_non_functional(&mut summary)?;
        self.migrate_contracts(&mut summary)?;
        self.create_external_interfaces(&mut summary)?;
        self.migrate_units(&mut summary)?;
        self.extract_design_decisions(&mut summary)?;

        info!(
            documents = summary.documents_created(),
            warnings = summary.warnings.len(),
            "Migration complete"
        );
        Ok(summary)
    }

    fn relative(&self, file: &Path) -> String {
        path::relative_to(file, &self.layout.root)
            .map(path::to_unix_string)
            .unwrap_or_else(|| file.display().to_string())
    }

    fn skip(&self, summary: &mut MigrationSummary, missing: &Path) {
        let message = format!("{} not found, skipping", self.relative(missing));
        warn!("{message}");
        summary.warnings.push(message);
    }

    fn write(
        &self,
        summary: &mut MigrationSummary,
        dir: &Path,
        id: &DocId,
        title: &str,
        template: &str,
        data: &impl Serialize,
    ) -> Result<(), MigrateError> {
        let content = self
            .renderer
            .render(template, data)
            .map_err(|source| MigrateError::Render {
                id: id.clone(),
                source,
            })?;
        let path = dir.join(id.file_name(title));
        fs::write_string_atomic(&path, &content)?;
        info!(id = %id, file = %self.relative(&path), "Created");
        summary.written.push(self.relative(&path));
        Ok(())
    }

    fn migrate_user_stories(&self, summary: &mut MigrationSummary) -> Result<(), MigrateError> {
        let mut report = StepReport {
            step: Step::UserStories,
            created: 0,
            skipped: 0,
        };

        for feature in &self.plan.features {
            if feature.user_stories.is_empty() {
                continue;
            }
            let spec_path = self.layout.specs_dir.join(feature.spec_file());
            if !spec_path.is_file() {
                self.skip(summary, &spec_path);
                report.skipped += feature.user_stories.len();
                continue;
            }

            debug!(feature = %feature.key, "Extracting user stories");
            let source = fs::read_document(&spec_path)?;
            let stories = extract_user_stories(&source).map_err(|source| MigrateError::Extract {
                path: spec_path.clone(),
                source,
            })?;

            for story in &stories {
                let Some(mapping) = feature.story(&story.story) else {
                    debug!(story = %story.story, feature = %feature.key, "No mapping, skipping");
                    continue;
                };
                let data = UserStoryContext {
                    id: &mapping.id,
                    title: &mapping.title,
                    priority: story.priority.to_string(),
                    narrative: &story.narrative,
                    verification: story.verification(),
                    pending: &self.pending,
                };
                self.write(
                    summary,
                    &self.layout.requirements_dir,
                    &mapping.id,
                    &mapping.title,
                    "req_user_story",
                    &data,
                )?;
                report.created += 1;
            }
        }

        summary.steps.push(report);
        Ok(())
    }

    fn migrate_functional(&self, summary: &mut MigrationSummary) -> Result<(), MigrateError> {
        let mut report = StepReport {
            step: Step::FunctionalRequirements,
            created: 0,
            skipped: 0,
        };

        for feature in &self.plan.features {
            let source = self.feature_source(feature);
            let mut seen = BTreeSet::new();
            for mapping in &feature.functional {
                if !seen.insert(&mapping.id) {
                    continue;
                }
                let path = self
                    .layout
                    .requirements_dir
                    .join(mapping.id.file_name(&mapping.title));
                if path.exists() {
                    debug!(id = %mapping.id, "Already generated, skipping");
                    report.skipped += 1;
                    continue;
                }
                let data = RequirementContext {
                    id: &mapping.id,
                    title: &mapping.title,
                    source: &source,
                    pending: &self.pending,
                };
                self.write(
                    summary,
                    &self.layout.requirements_dir,
                    &mapping.id,
                    &mapping.title,
                    "req_functional",
                    &data,
                )?;
                report.created += 1;
            }
        }

        summary.steps.push(report);
        Ok(())
    }

    fn feature_source(&self, feature: &FeaturePlan) -> String {
        self.relative(&self.layout.specs_dir.join(feature.spec_file()))
    }

    fn migrate_non_functional(&self, summary: &mut MigrationSummary) -> Result<(), MigrateError> {
        let mut report = StepReport {
            step: Step::NonFunctionalRequirements,
            created: 0,
            skipped: 0,
        };

        for doc in &self.plan.non_functional {
            let data = RequirementContext {
                id: &doc.id,
                title: &doc.title,
                source: "",
                pending: &self.pending,
            };
            self.write(
                summary,
                &self.layout.requirements_dir,
                &doc.id,
                &doc.title,
                "req_non_functional",
                &data,
            )?;
            report.created += 1;
        }

        summary.steps.push(report);
        Ok(())
    }

    fn migrate_contracts(&self, summary: &mut MigrationSummary) -> Result<(), MigrateError> {
        let mut report = StepReport {
            step: Step::Contracts,
            created: 0,
            skipped: 0,
        };

        for contract in &self.plan.contracts {
            let contract_path = self.layout.specs_dir.join(&contract.path);
            if !contract_path.is_file() {
                self.skip(summary, &contract_path);
                report.skipped += 1;
                continue;
            }

            let text = fs::read_document(&contract_path)?;
            let specification =
                nest_headings(strip_title(&text).trim()).map_err(|source| MigrateError::Parse {
                    path: contract_path.clone(),
                    source,
                })?;
            let source = self.relative(&contract_path);
            let data = ContractContext {
                id: &contract.id,
                title: &contract.title,
                interface_type: &contract.interface_type,
                specification: &specification,
                source: &source,
                pending: &self.pending,
            };
            self.write(
                summary,
                &self.layout.interfaces_dir,
                &contract.id,
                &contract.title,
                "int_contract",
                &data,
            )?;
            report.created += 1;
        }

        summary.steps.push(report);
        Ok(())
    }

    fn create_external_interfaces(&self, summary: &mut MigrationSummary) -> Result<(), MigrateError> {
        let mut report = StepReport {
            step: Step::ExternalInterfaces,
            created: 0,
            skipped: 0,
        };

        for external in &self.plan.external_interfaces {
            let data = ExternalContext {
                id: &external.id,
                title: &external.title,
                reference: &external.reference,
                pending: &self.pending,
                open: &self.open,
            };
            self.write(
                summary,
                &self.layout.interfaces_dir,
                &external.id,
                &external.title,
                "int_external",
                &data,
            )?;
            report.created += 1;
        }

        summary.steps.push(report);
        Ok(())
    }

    fn migrate_units(&self, summary: &mut MigrationSummary) -> Result<(), MigrateError> {
        let mut report = StepReport {
            step: Step::Units,
            created: 0,
            skipped: 0,
        };

        for component in &self.plan.components {
            debug!(component = %component.name, "Migrating design units");
            for unit in &component.units {
                let data = UnitContext {
                    id: &unit.id,
                    title: &unit.title,
                    purpose: &unit.purpose,
                    file: &unit.file,
                    component: &component.name,
                    pending: &self.pending,
                    open: &self.open,
                };
                self.write(
                    summary,
                    &self.layout.design_dir,
                    &unit.id,
                    &unit.title,
                    "unit",
                    &data,
                )?;
                report.created += 1;
            }
        }

        summary.steps.push(report);
        Ok(())
    }

    fn decision_date(&self) -> String {
        self.options
            .adr_date
            .clone()
            .unwrap_or_else(|| chrono::Local::now().date_naive().format("%Y-%m-%d").to_string())
    }

    /// Append the first sections of each research file to the decision log.
    ///
    /// Numbering continues after the highest `DD-nnn` already in the log and
    /// titles already recorded are not added again.
    fn extract_design_decisions(&self, summary: &mut MigrationSummary) -> Result<(), MigrateError> {
        let mut report = StepReport {
            step: Step::DesignDecisions,
            created: 0,
            skipped: 0,
        };

        let log_path = self.layout.design_dir.join(DECISIONS_FILE);
        let existing = if log_path.is_file() {
            fs::read_document(&log_path)?
        } else {
            DECISIONS_HEADER.to_string()
        };

        let mut recorded: BTreeSet<String> = BTreeSet::new();
        let mut last_number = 0u32;
        for caps in DECISION_HEADING.captures_iter(&existing) {
            last_number = last_number.max(caps[1].parse().unwrap_or(0));
            recorded.insert(caps[2].to_string());
        }

        let date = self.decision_date();
        let consequences =
            SectionBody::pending("- Document specific trade-offs and implications.").to_string();
        let mut entries = Vec::new();

        for research in self.plan.research_files() {
            let research_path = self.layout.specs_dir.join(research);
            if !research_path.is_file() {
                debug!(path = %research_path.display(), "No research notes");
                continue;
            }

            let text = fs::read_document(&research_path)?;
            let markdown = Markdown::parse(text).map_err(|source| MigrateError::Parse {
                path: research_path.clone(),
                source,
            })?;
            let source = self.relative(&research_path);

            let topics = markdown
                .sections()
                .iter()
                .filter(|s| s.level == 2)
                .take(self.options.adrs_per_research_file);
            for section in topics {
                if !recorded.insert(section.heading.clone()) {
                    report.skipped += 1;
                    continue;
                }
                last_number += 1;

                let body = &markdown.source()[section.body_span.clone()];
                let context: String = body.chars().take(self.options.adr_context_chars).collect();
                let data = DecisionContext {
                    number: format!("DD-{last_number:03}"),
                    title: &section.heading,
                    date: &date,
                    context: context.trim().to_string(),
                    source: &source,
                    consequences: consequences.clone(),
                };
                let entry = self
                    .renderer
                    .render("adr", &data)
                    .map_err(|source| MigrateError::Decision {
                        number: data.number.clone(),
                        source,
                    })?;
                entries.push(entry);
            }
        }

        if !entries.is_empty() {
            let updated = format!("{existing}\n{}", entries.join("\n"));
            fs::write_string_atomic(&log_path, &updated)?;
            info!(count = entries.len(), file = %self.relative(&log_path), "Added design decisions");
            summary.written.push(self.relative(&log_path));
        }

        report.created = entries.len();
        summary.steps.push(report);
        Ok(())
    }
}

/// Drop a leading `# Title` line.
fn strip_title(text: &str) -> &str {
    if text.starts_with("# ") || text.starts_with("#\t") {
        text.split_once('\n').map_or("", |(_, rest)| rest)
    } else {
        text
    }
}

/// Push every heading outside code fences one level down, and to at least
/// level 3, so the text stays under the `## Specification` heading.
fn nest_headings(text: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(text.len() + 16);
    let mut fences = FenceTracker::default();
    for (index, line) in text.lines().enumerate() {
        let level = line.chars().take_while(|&c| c == '#').count();
        if !fences.feed(line, index + 1)
            && (1..=6).contains(&level)
            && line[level..].starts_with([' ', '\t'])
        {
            out.push_str(&"#".repeat((level + 1).clamp(3, 6)));
            out.push_str(&line[level..]);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    fences.finish()?;
    out.truncate(out.trim_end().len());
    Ok(out)
}

/// Migration errors.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    Templates(#[from] RenderError),

    #[error("failed to render {id}: {source}")]
    Render {
        id: DocId,
        #[source]
        source: RenderError,
    },

    #[error("failed to render {number}: {source}")]
    Decision {
        number: String,
        #[source]
        source: RenderError,
    },

    #[error("failed to extract user stories from {}: {source}", path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}
