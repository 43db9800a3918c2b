use std::fs;
use std::path::{Path, PathBuf};

use syskit_common_config::{ProjectLayout, SyskitConfig, ValidationConfig};
use syskit_doc::DocDirs;
use syskit_migrate::{MigrationPlan, Migrator};
use syskit_trace::{establish, TraceTables};
use syskit_validate::{validate, ValidationReport};
use tempfile::TempDir;

const PLAN: &str = r#"
features:
  - key: 001-gpu
    user_stories:
      - { story: US-1, id: REQ-001, title: Host Communication }
      - { story: US-2, id: REQ-002, title: Framebuffers }
    functional:
      - { item: FR-1, id: REQ-020, title: SPI Interface }
non_functional:
  - { id: REQ-050, title: Performance Targets }
contracts:
  - { path: 001-gpu/contracts/register-map.md, id: INT-010, title: GPU Register Map, type: Internal }
external_interfaces:
  - { id: INT-001, title: SPI Mode 0, reference: Mode 0 timing. }
components:
  - name: spi_gpu
    units:
      - { id: UNIT-001, title: SPI Slave, file: spi_gpu/src/spi/spi_slave.sv, purpose: Receives SPI transactions }
      - { id: UNIT-003, title: Register File, file: spi_gpu/src/spi/register_file.sv, purpose: Stores GPU state }
"#;

const TABLES: &str = r#"
req_to_ints:
  REQ-001: [INT-001, INT-010]
  REQ-002: [INT-010]
  REQ-020: [INT-001]
req_to_units:
  REQ-001: [UNIT-001, UNIT-003]
  REQ-002: [UNIT-003]
  REQ-020: [UNIT-001]
  REQ-050: [UNIT-001]
unit_to_ints:
  UNIT-001: { provides: [], consumes: [INT-001, INT-010] }
  UNIT-003: { provides: [INT-010], consumes: [] }
"#;

const FEATURE_SPEC: &str = r#"# Feature Specification: GPU

### US-1: Host talks to GPU

**Priority:** P1

**As a** firmware developer
**I want to** write registers
**So that** the GPU is configurable

### US-2: Framebuffers

**Priority:** P2

**Acceptance Criteria:**
- Two buffers swap on vsync
"#;

const CONTRACT: &str = "# Register Map\n\n## Registers\n\n| Addr | Name |\n|------|------|\n| 0x00 | COLOR |\n";

struct Project {
    dir: TempDir,
    layout: ProjectLayout,
    plan: MigrationPlan,
    config: ValidationConfig,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let specs = dir.path().join("specs/001-gpu");
        fs::create_dir_all(specs.join("contracts")).unwrap();
        fs::write(specs.join("spec.md"), FEATURE_SPEC).unwrap();
        fs::write(specs.join("contracts/register-map.md"), CONTRACT).unwrap();

        let layout = SyskitConfig::default().layout(dir.path());
        Self {
            layout,
            plan: MigrationPlan::from_yaml(PLAN, "test").unwrap(),
            config: ValidationConfig {
                min_documents: 8,
                expected_documents: 8,
                ..ValidationConfig::default()
            },
            dir,
        }
    }

    fn migrate(&self) {
        let config = SyskitConfig::default();
        Migrator::new(&self.layout, &self.plan, &config.migration)
            .unwrap()
            .run()
            .unwrap();
    }

    fn trace(&self) {
        let tables = TraceTables::from_yaml(TABLES, "test").unwrap();
        establish(&DocDirs::from_layout(&self.layout), &tables).unwrap();
    }

    fn validate(&self) -> ValidationReport {
        validate(&self.layout, &self.config, &self.plan).unwrap()
    }

    fn doc(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }
}

fn issues<'a>(report: &'a ValidationReport, check: &str) -> &'a [String] {
    &report.check(check).unwrap().issues
}

#[test]
fn migrated_and_traced_corpus_passes() {
    let project = Project::new();
    project.migrate();
    project.trace();

    let report = project.validate();

    for outcome in &report.checks {
        assert!(outcome.passed, "{}: {} {:?}", outcome.name, outcome.message, outcome.issues);
    }
    assert!(report.passed());
    assert!(issues(&report, "reference_integrity").is_empty());
    assert_eq!(report.checks.len(), 5);
}

#[test]
fn untraced_corpus_reports_pending_sections() {
    let project = Project::new();
    project.migrate();

    let report = project.validate();

    assert!(!report.passed());
    let required = issues(&report, "required_fields");
    assert!(required.contains(&"REQ-001: Allocated To still contains TBD".to_string()));
    assert!(required.contains(&"UNIT-003: Implements Requirements still contains TBD".to_string()));
    assert!(required.contains(&"INT-010: Parties still contains TBD".to_string()));
    // External interfaces may keep open parties
    assert!(!required.iter().any(|i| i.starts_with("INT-001: Parties")));

    let traceability = issues(&report, "traceability_completeness");
    assert!(traceability.contains(&"REQ-050: Not allocated to any UNIT".to_string()));
    assert!(traceability.contains(&"INT-010: Not referenced by any REQ".to_string()));
    assert!(!traceability.iter().any(|i| i.starts_with("INT-001")));
}

#[test]
fn dangling_reference_is_single_issue() {
    let project = Project::new();
    project.migrate();
    project.trace();

    let path = project.doc("doc/requirements/req_002_framebuffers.md");
    let mut text = fs::read_to_string(&path).unwrap();
    text.push_str("\nSee also UNIT-099.\n");
    fs::write(&path, text).unwrap();

    let report = project.validate();

    assert!(!report.passed());
    let outcome = report.check("reference_integrity").unwrap();
    assert!(!outcome.passed);
    assert_eq!(outcome.issues, vec!["REQ-002 → UNIT-099 (not found)"]);
    assert_eq!(report.failed().count(), 1);
}

#[test]
fn missing_contract_document_fails_migration_check() {
    let project = Project::new();
    project.migrate();
    project.trace();
    fs::write(
        project.root().join("specs/001-gpu/contracts/dma.md"),
        "# DMA\n\nUnplanned contract.\n",
    )
    .unwrap();

    let report = project.validate();

    assert_eq!(
        issues(&report, "migration_completeness"),
        ["Expected at least 2 internal INT docs, found 1"]
    );
}

#[test]
fn document_count_uses_configured_threshold() {
    let mut project = Project::new();
    project.migrate();
    project.trace();
    project.config.min_documents = 9;
    project.config.expected_documents = 12;

    let report = project.validate();

    let outcome = report.check("document_count").unwrap();
    assert!(!outcome.passed);
    assert_eq!(outcome.message, "Expected ~12 documents, found 8");
}

#[test]
fn report_serializes_for_json_output() {
    let project = Project::new();
    project.migrate();
    project.trace();

    let json = serde_json::to_value(project.validate()).unwrap();

    assert_eq!(json["checks"][0]["name"], "document_count");
    assert_eq!(json["checks"][0]["passed"], true);
    assert!(json["checks"][1]["issues"].as_array().unwrap().is_empty());
}
