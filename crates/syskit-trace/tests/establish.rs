use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use proptest::prelude::*;
use syskit_doc::{references_of, Corpus, DocDirs, DocId, DocKind, Markdown, Templates};
use syskit_trace::{establish, Establisher, Pass, TraceTables};
use tempfile::TempDir;

const TABLES: &str = r#"
req_to_ints:
  REQ-002: [INT-011, INT-010]
  REQ-003: []
req_to_units:
  REQ-002: [UNIT-003, UNIT-007]
unit_to_ints:
  UNIT-003: { provides: [INT-010], consumes: [] }
  UNIT-006: { provides: [], consumes: [INT-010, INT-011] }
"#;

fn requirement(id: &str, title: &str) -> String {
    format!(
        "# {id}: {title}\n\n## Requirement\n\nThe system SHALL do it.\n\n\
         ## Allocated To\n\nTBD (will be filled by syskit trace)\n\n\
         ## Interfaces\n\nTBD (will be filled by syskit trace)\n\n\
         ## Notes\n\nNone\n"
    )
}

fn interface(id: &str, title: &str) -> String {
    format!(
        "# {id}: {title}\n\n## Type\n\nInternal\n\n\
         ## Parties\n\nTBD (will be filled by syskit trace)\n\n\
         ## Referenced By\n\nTBD (will be filled by syskit trace)\n\n\
         ## Specification\n\nDetails.\n"
    )
}

fn unit(id: &str, title: &str) -> String {
    format!(
        "# {id}: {title}\n\n## Purpose\n\nDoes things.\n\n\
         ## Implements Requirements\n\nTBD (will be filled by syskit trace)\n\n\
         ## Interfaces\n\n### Provides\n\nTBD (will be filled by syskit trace)\n\n\
         ### Consumes\n\nTBD (will be filled by syskit trace)\n\n\
         ### Internal Interfaces\n\nTBD\n\n\
         ## Implementation\n\n- `rtl/unit.sv`: Main implementation\n"
    )
}

struct Fixture {
    _dir: TempDir,
    dirs: DocDirs,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("doc");
        let dirs = DocDirs {
            requirements: root.join("requirements"),
            interfaces: root.join("interfaces"),
            design: root.join("design"),
        };
        for kind in DocKind::ALL {
            fs::create_dir_all(dirs.dir(kind)).unwrap();
        }
        Self { _dir: dir, dirs }
    }

    fn write(&self, kind: DocKind, file: &str, content: &str) -> PathBuf {
        let path = self.dirs.dir(kind).join(file);
        fs::write(&path, content).unwrap();
        path
    }

    fn standard() -> Self {
        let fx = Self::new();
        fx.write(DocKind::Req, "req_002_framebuffer_management.md", &requirement("REQ-002", "Framebuffer Management"));
        fx.write(DocKind::Req, "req_003_display_output.md", &requirement("REQ-003", "Display Output"));
        fx.write(DocKind::Int, "int_010_gpu_register_map.md", &interface("INT-010", "GPU Register Map"));
        fx.write(DocKind::Int, "int_011_sram_memory_layout.md", &interface("INT-011", "SRAM Memory Layout"));
        fx.write(DocKind::Int, "int_012_unused_bus.md", &interface("INT-012", "Unused Bus"));
        fx.write(DocKind::Unit, "unit_003_register_file.md", &unit("UNIT-003", "Register File"));
        fx.write(DocKind::Unit, "unit_006_pixel_pipeline.md", &unit("UNIT-006", "Pixel Pipeline"));
        fx
    }

    fn read(&self, kind: DocKind, file: &str) -> String {
        fs::read_to_string(self.dirs.dir(kind).join(file)).unwrap()
    }

    fn snapshot(&self) -> BTreeMap<PathBuf, String> {
        DocKind::ALL
            .into_iter()
            .flat_map(|kind| fs::read_dir(self.dirs.dir(kind)).unwrap())
            .map(|entry| {
                let path = entry.unwrap().path();
                let text = fs::read_to_string(&path).unwrap();
                (path, text)
            })
            .collect()
    }
}

fn tables() -> TraceTables {
    TraceTables::from_yaml(TABLES, "test").unwrap()
}

fn section(text: &str, name: &str) -> String {
    Markdown::parse(text).unwrap().section_text(name).unwrap().to_string()
}

#[test]
fn forward_interfaces_keep_table_order() {
    let fx = Fixture::standard();
    establish(&fx.dirs, &tables()).unwrap();

    let text = fx.read(DocKind::Req, "req_002_framebuffer_management.md");
    assert_eq!(
        section(&text, "Interfaces"),
        "- INT-011 (SRAM Memory Layout)\n- INT-010 (GPU Register Map)"
    );
}

#[test]
fn missing_documents_render_unknown_title() {
    let fx = Fixture::standard();
    establish(&fx.dirs, &tables()).unwrap();

    let text = fx.read(DocKind::Req, "req_002_framebuffer_management.md");
    assert_eq!(
        section(&text, "Allocated To"),
        "- UNIT-003 (Register File)\n- UNIT-007 (Unknown)"
    );
}

#[test]
fn empty_or_absent_entries_leave_sections_pending() {
    let fx = Fixture::standard();
    establish(&fx.dirs, &tables()).unwrap();

    let text = fx.read(DocKind::Req, "req_003_display_output.md");
    let md = Markdown::parse(text.as_str()).unwrap();
    assert!(md.section("Interfaces").unwrap().body.is_pending());
    assert!(md.section("Allocated To").unwrap().body.is_pending());

    // UNIT-006 implements nothing
    let unit = Markdown::parse(fx.read(DocKind::Unit, "unit_006_pixel_pipeline.md")).unwrap();
    assert!(unit.section("Implements Requirements").unwrap().body.is_pending());
}

#[test]
fn reverse_references_are_sorted() {
    let fx = Fixture::new();
    fx.write(DocKind::Req, "req_001_a.md", &requirement("REQ-001", "Alpha"));
    fx.write(DocKind::Req, "req_004_b.md", &requirement("REQ-004", "Beta"));
    fx.write(DocKind::Int, "int_010_map.md", &interface("INT-010", "Map"));
    let tables = TraceTables::from_yaml(
        "req_to_ints:\n  REQ-004: [INT-010]\n  REQ-001: [INT-010]\n",
        "test",
    )
    .unwrap();

    establish(&fx.dirs, &tables).unwrap();

    assert_eq!(
        section(&fx.read(DocKind::Int, "int_010_map.md"), "Referenced By"),
        "- REQ-001 (Alpha)\n- REQ-004 (Beta)"
    );
}

#[test]
fn parties_list_providers_then_consumers() {
    let fx = Fixture::standard();
    establish(&fx.dirs, &tables()).unwrap();

    assert_eq!(
        section(&fx.read(DocKind::Int, "int_010_gpu_register_map.md"), "Parties"),
        "- **Provider:** UNIT-003 (Register File)\n- **Consumer:** UNIT-006 (Pixel Pipeline)"
    );
    assert_eq!(
        section(&fx.read(DocKind::Int, "int_011_sram_memory_layout.md"), "Parties"),
        "- **Provider:** External\n- **Consumer:** UNIT-006 (Pixel Pipeline)"
    );
}

#[test]
fn unused_interface_has_external_provider_only() {
    let fx = Fixture::standard();
    establish(&fx.dirs, &tables()).unwrap();

    let text = fx.read(DocKind::Int, "int_012_unused_bus.md");
    assert_eq!(section(&text, "Parties"), "- **Provider:** External");
    assert!(!text.contains("**Consumer:**"));
    // Nothing references it
    assert!(Markdown::parse(text).unwrap().section("Referenced By").unwrap().body.is_pending());
}

#[test]
fn unit_interfaces_render_none_when_empty() {
    let fx = Fixture::standard();
    establish(&fx.dirs, &tables()).unwrap();

    let text = fx.read(DocKind::Unit, "unit_003_register_file.md");
    assert_eq!(section(&text, "Provides"), "- INT-010 (GPU Register Map)");
    assert_eq!(section(&text, "Consumes"), "None");
    assert_eq!(section(&text, "Implements Requirements"), "- REQ-002 (Framebuffer Management)");
    // Sections outside the tables stay open
    assert!(text.contains("### Internal Interfaces\n\nTBD\n"));
}

#[test]
fn second_run_changes_nothing() {
    let fx = Fixture::standard();
    let first = establish(&fx.dirs, &tables()).unwrap();
    assert!(first.written > 0);
    let before = fx.snapshot();

    let second = establish(&fx.dirs, &tables()).unwrap();

    assert_eq!(second.updates(), 0);
    assert_eq!(second.written, 0);
    assert_eq!(fx.snapshot(), before);
}

#[test]
fn filled_sections_are_not_overwritten() {
    let fx = Fixture::new();
    let text = requirement("REQ-002", "Framebuffer Management")
        .replacen("TBD (will be filled by syskit trace)", "- UNIT-009 (Hand Written)", 1);
    fx.write(DocKind::Req, "req_002_fb.md", &text);

    establish(&fx.dirs, &tables()).unwrap();

    let after = fx.read(DocKind::Req, "req_002_fb.md");
    assert_eq!(section(&after, "Allocated To"), "- UNIT-009 (Hand Written)");
    assert_eq!(
        section(&after, "Interfaces"),
        "- INT-011 (Unknown)\n- INT-010 (Unknown)"
    );
}

#[test]
fn templates_supply_titles_but_stay_untouched() {
    let fx = Fixture::new();
    let template = interface("INT-000", "Interface Template");
    fx.write(DocKind::Int, "int_000_template.md", &template);
    fx.write(DocKind::Req, "req_001_a.md", &requirement("REQ-001", "Alpha"));
    let tables = TraceTables::from_yaml("req_to_ints:\n  REQ-001: [INT-000]\n", "test").unwrap();

    let report = establish(&fx.dirs, &tables).unwrap();

    assert_eq!(fx.read(DocKind::Int, "int_000_template.md"), template);
    assert_eq!(
        section(&fx.read(DocKind::Req, "req_001_a.md"), "Interfaces"),
        "- INT-000 (Interface Template)"
    );
    assert_eq!(report.scanned[&DocKind::Int], 1);
}

#[test]
fn report_counts_updates_per_pass() {
    let fx = Fixture::standard();
    let report = establish(&fx.dirs, &tables()).unwrap();

    let updated = |pass| report.pass(pass).unwrap().updated.len();
    assert_eq!(updated(Pass::ReqInterfaces), 1);
    assert_eq!(updated(Pass::ReqAllocation), 1);
    assert_eq!(updated(Pass::IntReferences), 2);
    assert_eq!(updated(Pass::IntParties), 3);
    assert_eq!(updated(Pass::UnitRequirements), 1);
    assert_eq!(updated(Pass::UnitInterfaces), 2);
    assert_eq!(report.written, 6);
}

fn id(kind: DocKind, n: u32) -> DocId {
    DocId::new(kind, format!("{n:03}")).unwrap()
}

fn table_strategy() -> impl Strategy<Value = TraceTables> {
    let req_to_ints = prop::collection::btree_map(1u32..6, prop::collection::vec(1u32..6, 0..4), 0..6);
    let req_to_units = prop::collection::btree_map(1u32..6, prop::collection::vec(1u32..6, 0..4), 0..6);
    (req_to_ints, req_to_units).prop_map(|(ints, units)| {
        let dedup = |list: Vec<u32>, kind| {
            let mut seen = Vec::new();
            for n in list {
                let id = id(kind, n);
                if !seen.contains(&id) {
                    seen.push(id);
                }
            }
            seen
        };
        TraceTables {
            req_to_ints: ints
                .into_iter()
                .map(|(r, list)| (id(DocKind::Req, r), dedup(list, DocKind::Int)))
                .collect(),
            req_to_units: units
                .into_iter()
                .map(|(r, list)| (id(DocKind::Req, r), dedup(list, DocKind::Unit)))
                .collect(),
            ..TraceTables::default()
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Reverse sections written to disk name exactly the inverse of the forward tables.
    #[test]
    fn written_links_match_tables(tables in table_strategy()) {
        let fx = Fixture::new();
        for n in 1..6 {
            fx.write(DocKind::Req, &format!("req_{n:03}_r.md"), &requirement(&id(DocKind::Req, n).to_string(), "R"));
            fx.write(DocKind::Int, &format!("int_{n:03}_i.md"), &interface(&id(DocKind::Int, n).to_string(), "I"));
            fx.write(DocKind::Unit, &format!("unit_{n:03}_u.md"), &unit(&id(DocKind::Unit, n).to_string(), "U"));
        }

        let mut corpus = Corpus::load(&fx.dirs, Templates::Include).unwrap();
        Establisher::new(&tables).establish(&mut corpus).unwrap();

        let int_to_reqs = tables.int_to_reqs();
        for doc in corpus.documents(DocKind::Int) {
            let refs = doc.markdown().section_text("Referenced By").map(|t| references_of(t, DocKind::Req));
            match int_to_reqs.get(doc.id()) {
                Some(expected) => prop_assert_eq!(refs.unwrap(), expected.clone()),
                None => prop_assert!(doc.markdown().section("Referenced By").unwrap().body.is_pending()),
            }
        }

        let unit_to_reqs = tables.unit_to_reqs();
        for doc in corpus.documents(DocKind::Unit) {
            let section = doc.markdown().section_text("Implements Requirements").unwrap();
            match unit_to_reqs.get(doc.id()) {
                Some(expected) => prop_assert_eq!(references_of(section, DocKind::Req), expected.clone()),
                None => prop_assert!(doc.markdown().section("Implements Requirements").unwrap().body.is_pending()),
            }
        }

        for doc in corpus.documents(DocKind::Req) {
            let listed: Vec<DocId> = doc
                .markdown()
                .section_text("Interfaces")
                .unwrap()
                .lines()
                .filter_map(|line| line.strip_prefix("- "))
                .filter_map(|item| item.split_whitespace().next()?.parse().ok())
                .collect();
            let expected = tables.req_to_ints.get(doc.id()).cloned().unwrap_or_default();
            prop_assert_eq!(listed, expected);
        }
    }
}
