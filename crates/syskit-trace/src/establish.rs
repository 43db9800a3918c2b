//! Resolves pending traceability sections from the tables.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use syskit_doc::{Corpus, CorpusError, DocDirs, DocId, DocKind, Document, Templates};
use tracing::{debug, info};

use crate::render::TitleIndex;
use crate::tables::{Parties, TableError, TraceTables};

/// One linking pass. Passes run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    /// REQ `Interfaces` from `req_to_ints`.
    ReqInterfaces,
    /// REQ `Allocated To` from `req_to_units`.
    ReqAllocation,
    /// INT `Referenced By` from the inverse of `req_to_ints`.
    IntReferences,
    /// INT `Parties` from the inverse of `unit_to_ints`.
    IntParties,
    /// UNIT `Implements Requirements` from the inverse of `req_to_units`.
    UnitRequirements,
    /// UNIT `Provides` and `Consumes` from `unit_to_ints`.
    UnitInterfaces,
}

impl Pass {
    pub const ALL: [Pass; 6] = [
        Pass::ReqInterfaces,
        Pass::ReqAllocation,
        Pass::IntReferences,
        Pass::IntParties,
        Pass::UnitRequirements,
        Pass::UnitInterfaces,
    ];

    /// Kind of document the pass rewrites.
    pub fn kind(self) -> DocKind {
        match self {
            Self::ReqInterfaces | Self::ReqAllocation => DocKind::Req,
            Self::IntReferences | Self::IntParties => DocKind::Int,
            Self::UnitRequirements | Self::UnitInterfaces => DocKind::Unit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ReqInterfaces => "REQ → INT",
            Self::ReqAllocation => "REQ → UNIT",
            Self::IntReferences => "INT → REQ",
            Self::IntParties => "INT → UNIT",
            Self::UnitRequirements => "UNIT → REQ",
            Self::UnitInterfaces => "UNIT → INT",
        }
    }
}

/// Documents updated by one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub pass: Pass,
    pub updated: Vec<DocId>,
}

/// Outcome of a linking run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    /// Documents scanned per kind, templates included.
    pub scanned: BTreeMap<DocKind, usize>,
    pub passes: Vec<PassReport>,
    /// Files rewritten on disk.
    pub written: usize,
}

impl LinkReport {
    pub fn pass(&self, pass: Pass) -> Option<&PassReport> {
        self.passes.iter().find(|p| p.pass == pass)
    }

    /// Number of section updates across all passes.
    pub fn updates(&self) -> usize {
        self.passes.iter().map(|p| p.updated.len()).sum()
    }
}

/// Applies [`TraceTables`] to a corpus.
#[derive(Debug)]
pub struct Establisher<'a> {
    tables: &'a TraceTables,
    int_to_reqs: BTreeMap<DocId, BTreeSet<DocId>>,
    unit_to_reqs: BTreeMap<DocId, BTreeSet<DocId>>,
    int_parties: BTreeMap<DocId, Parties>,
}

impl<'a> Establisher<'a> {
    pub fn new(tables: &'a TraceTables) -> Self {
        Self {
            int_to_reqs: tables.int_to_reqs(),
            unit_to_reqs: tables.unit_to_reqs(),
            int_parties: tables.int_parties(),
            tables,
        }
    }

    /// Run every pass over `corpus` in memory.
    ///
    /// Sections that are not pending are never touched, so a second run
    /// changes nothing.
    pub fn establish(&self, corpus: &mut Corpus) -> Result<LinkReport, EstablishError> {
        let titles = TitleIndex::from_corpus(corpus);
        debug!(titles = titles.len(), "Built title index");

        let mut report = LinkReport {
            scanned: DocKind::ALL
                .into_iter()
                .map(|kind| (kind, corpus.count(kind)))
                .collect(),
            ..LinkReport::default()
        };

        for pass in Pass::ALL {
            info!("Establishing {} links", pass.label());
            let mut updated = Vec::new();
            for doc in corpus
                .documents_mut(pass.kind())
                .iter_mut()
                .filter(|doc| !doc.is_template())
            {
                if self.apply(pass, doc, &titles)? {
                    info!(id = %doc.id(), "{} linked", pass.label());
                    updated.push(doc.id().clone());
                }
            }
            report.passes.push(PassReport { pass, updated });
        }

        Ok(report)
    }

    fn apply(&self, pass: Pass, doc: &mut Document, titles: &TitleIndex) -> Result<bool, EstablishError> {
        let id = doc.id().clone();
        let changed = match pass {
            Pass::ReqInterfaces => match self.tables.req_to_ints.get(&id) {
                Some(ints) if !ints.is_empty() => doc.resolve("Interfaces", &titles.bullet_list(ints))?,
                _ => false,
            },
            Pass::ReqAllocation => match self.tables.req_to_units.get(&id) {
                Some(units) if !units.is_empty() => {
                    doc.resolve("Allocated To", &titles.bullet_list(units))?
                }
                _ => false,
            },
            Pass::IntReferences => match self.int_to_reqs.get(&id) {
                Some(reqs) => doc.resolve("Referenced By", &titles.bullet_list(reqs))?,
                None => false,
            },
            Pass::IntParties => {
                let block = match self.int_parties.get(&id) {
                    Some(parties) => titles.parties_block(parties),
                    None => titles.parties_block(&Parties::default()),
                };
                doc.resolve("Parties", &block)?
            }
            Pass::UnitRequirements => match self.unit_to_reqs.get(&id) {
                Some(reqs) => doc.resolve("Implements Requirements", &titles.bullet_list(reqs))?,
                None => false,
            },
            Pass::UnitInterfaces => match self.tables.unit_to_ints.get(&id) {
                Some(ints) => {
                    let provides = doc.resolve("Provides", &titles.interface_list(&ints.provides))?;
                    let consumes = doc.resolve("Consumes", &titles.interface_list(&ints.consumes))?;
                    provides || consumes
                }
                None => false,
            },
        };
        Ok(changed)
    }
}

/// Load the corpus under `dirs`, link it and write back changed documents.
pub fn establish(dirs: &DocDirs, tables: &TraceTables) -> Result<LinkReport, EstablishError> {
    let mut corpus = Corpus::load(dirs, Templates::Include)?;
    info!(
        requirements = corpus.count(DocKind::Req),
        interfaces = corpus.count(DocKind::Int),
        units = corpus.count(DocKind::Unit),
        "Loaded corpus"
    );

    let mut report = Establisher::new(tables).establish(&mut corpus)?;
    report.written = corpus.save_modified()?;
    info!(
        updates = report.updates(),
        written = report.written,
        "Traceability established"
    );
    Ok(report)
}

/// Linking errors.
#[derive(Debug, thiserror::Error)]
pub enum EstablishError {
    #[error(transparent)]
    Tables(#[from] TableError),

    #[error(transparent)]
    Corpus(#[from] CorpusError),
}
