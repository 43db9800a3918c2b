//! Common test utilities for CLI testing.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::{tempdir, TempDir};

pub const PLAN: &str = r#"
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

pub const TABLES: &str = r#"
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

pub const CONFIG: &str = r#"
tables:
  migration: plan.yaml
  traceability: tables.yaml
validation:
  min_documents: 8
  expected_documents: 8
migration:
  adr_date: "2025-01-15"
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

/// Test context with a temporary speckit project
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Speckit tree, plan, tables and `.syskit/config.yaml`
    pub fn with_project(self) -> Self {
        self.write("specs/001-gpu/spec.md", FEATURE_SPEC);
        self.write("specs/001-gpu/contracts/register-map.md", CONTRACT);
        self.write("plan.yaml", PLAN);
        self.write("tables.yaml", TABLES);
        self.write(".syskit/config.yaml", CONFIG);
        self
    }

    /// Write `content` to `rel`, creating parent directories
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        fs::create_dir_all(path.parent().expect("relative path has a parent"))
            .expect("Failed to create directory");
        fs::write(path, content).expect("Failed to write file");
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path().join(rel)).expect("Failed to read file")
    }

    pub fn file(&self, rel: &str) -> PathBuf {
        self.path().join(rel)
    }

    /// Get path to temp directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a command configured for this context
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("syskit").expect("Binary not found");
        cmd.current_dir(self.path())
            .env_remove("SYSKIT_CONFIG")
            .env_remove("SYSKIT_SPECS_DIR")
            .env_remove("SYSKIT_DOC_DIR")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1"); // Disable colors for predictable output
        cmd
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
