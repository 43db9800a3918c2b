use std::fs;

use syskit_common_fs as sfs;

#[test]
fn test_roundtrip_through_atomic_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("design/unit_001_spi_slave.md");

    sfs::write_string_atomic(&path, "# UNIT-001: SPI Slave\n").unwrap();
    let content = sfs::read_document(&path).unwrap();

    assert_eq!(content, "# UNIT-001: SPI Slave\n");
}

#[test]
fn test_listing_ignores_other_prefixes_and_directories() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("unit_999_dir.md")).unwrap();
    fs::write(dir.path().join("unit_002_b.md"), "").unwrap();
    fs::write(dir.path().join("unit_001_a.md"), "").unwrap();
    fs::write(dir.path().join("design_decisions.md"), "").unwrap();

    let files = sfs::list_markdown(dir.path(), "unit").unwrap();
    let stems: Vec<_> = files.iter().filter_map(sfs::stem).collect();

    assert_eq!(stems, vec!["unit_001_a", "unit_002_b"]);
}

#[test]
fn test_glob_over_contract_directories() {
    let dir = tempfile::tempdir().unwrap();
    for feature in ["001-gpu", "002-host"] {
        let contracts = dir.path().join(feature).join("contracts");
        fs::create_dir_all(&contracts).unwrap();
        fs::write(contracts.join("api.md"), "# API\n").unwrap();
    }

    let pattern = format!(
        "{}/*/contracts/*.md",
        glob::Pattern::escape(&dir.path().to_string_lossy())
    );
    assert_eq!(sfs::list_glob(&pattern).unwrap().len(), 2);
}
