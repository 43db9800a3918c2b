//! Cross-reference token scanning.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::id::{DocId, DocKind};

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(REQ|INT|UNIT)-(\d+)\b").expect("reference pattern is valid"));

/// Every `REQ-n`, `INT-n` and `UNIT-n` token in `text`.
pub fn references(text: &str) -> BTreeSet<DocId> {
    REFERENCE
        .captures_iter(text)
        .filter_map(|caps| {
            let kind = DocKind::from_prefix(&caps[1])?;
            DocId::new(kind, &caps[2]).ok()
        })
        .collect()
}

/// References of one kind in `text`.
pub fn references_of(text: &str, kind: DocKind) -> BTreeSet<DocId> {
    references(text)
        .into_iter()
        .filter(|id| id.kind() == kind)
        .collect()
}
