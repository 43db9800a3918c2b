//! Title lookup and section bodies for resolved links.

use std::collections::BTreeMap;

use syskit_doc::{Corpus, DocId};

use crate::tables::Parties;

/// Title shown for ids with no readable document heading.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Document titles keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    titles: BTreeMap<DocId, String>,
}

impl TitleIndex {
    /// Index the `# ID: Title` heading of every document in `corpus`.
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let titles = corpus
            .iter()
            .filter_map(|doc| Some((doc.id().clone(), doc.title()?.to_string())))
            .collect();
        Self { titles }
    }

    pub fn get(&self, id: &DocId) -> &str {
        self.titles.get(id).map(String::as_str).unwrap_or(UNKNOWN_TITLE)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// `- ID (Title)` for `id`.
    pub fn item(&self, id: &DocId) -> String {
        format!("- {id} ({})", self.get(id))
    }

    /// One [`TitleIndex::item`] line per id, in iteration order.
    pub fn bullet_list<'a>(&self, ids: impl IntoIterator<Item = &'a DocId>) -> String {
        ids.into_iter()
            .map(|id| self.item(id))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Provider lines then consumer lines.
    pub fn parties_block(&self, parties: &Parties) -> String {
        let mut lines = Vec::with_capacity(parties.providers.len() + parties.consumers.len() + 1);
        if parties.providers.is_empty() {
            lines.push("- **Provider:** External".to_string());
        }
        for unit in &parties.providers {
            lines.push(format!("- **Provider:** {unit} ({})", self.get(unit)));
        }
        for unit in &parties.consumers {
            lines.push(format!("- **Consumer:** {unit} ({})", self.get(unit)));
        }
        lines.join("\n")
    }

    /// Interface list for a unit's Provides or Consumes section.
    pub fn interface_list(&self, ints: &[DocId]) -> String {
        if ints.is_empty() {
            "None".to_string()
        } else {
            self.bullet_list(ints)
        }
    }
}

impl FromIterator<(DocId, String)> for TitleIndex {
    fn from_iter<T: IntoIterator<Item = (DocId, String)>>(iter: T) -> Self {
        Self {
            titles: iter.into_iter().collect(),
        }
    }
}
