//! Forward traceability tables and their inverses.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use syskit_common_fs::{self as fs, FsError};
use syskit_doc::{DocId, DocKind};

/// Tables shipped with the binary.
pub const BUILTIN_TABLES: &str = include_str!("../data/traceability.yaml");

/// Interfaces a unit provides and consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitInterfaces {
    #[serde(default)]
    pub provides: Vec<DocId>,
    #[serde(default)]
    pub consumes: Vec<DocId>,
}

/// Units on either side of an interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Parties {
    pub providers: Vec<DocId>,
    pub consumers: Vec<DocId>,
}

/// The three forward adjacency tables.
///
/// List order is kept: forward sections render in the order written here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraceTables {
    #[serde(default)]
    pub req_to_ints: BTreeMap<DocId, Vec<DocId>>,
    #[serde(default)]
    pub req_to_units: BTreeMap<DocId, Vec<DocId>>,
    #[serde(default)]
    pub unit_to_ints: BTreeMap<DocId, UnitInterfaces>,
}

impl TraceTables {
    /// The built-in tables.
    pub fn builtin() -> Result<Self, TableError> {
        Self::from_yaml(BUILTIN_TABLES, "built-in traceability tables")
    }

    /// Load replacement tables from a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let contents = fs::read_document(path)?;
        Self::from_yaml(&contents, &path.display().to_string())
    }

    /// The tables at `path` when given, else the built-in ones.
    pub fn load(path: Option<&Path>) -> Result<Self, TableError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    /// Parse and check tables. `origin` names the source in errors.
    pub fn from_yaml(yaml: &str, origin: &str) -> Result<Self, TableError> {
        let tables: Self = serde_yaml::from_str(yaml).map_err(|e| TableError::Parse {
            origin: origin.to_string(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?;
        tables.check_kinds()?;
        Ok(tables)
    }

    fn check_kinds(&self) -> Result<(), TableError> {
        fn expect(id: &DocId, kind: DocKind, table: &'static str) -> Result<(), TableError> {
            if id.kind() == kind {
                Ok(())
            } else {
                Err(TableError::WrongKind {
                    id: id.clone(),
                    expected: kind,
                    table,
                })
            }
        }

        for (req, ints) in &self.req_to_ints {
            expect(req, DocKind::Req, "req_to_ints")?;
            ints.iter().try_for_each(|i| expect(i, DocKind::Int, "req_to_ints"))?;
        }
        for (req, units) in &self.req_to_units {
            expect(req, DocKind::Req, "req_to_units")?;
            units.iter().try_for_each(|u| expect(u, DocKind::Unit, "req_to_units"))?;
        }
        for (unit, ints) in &self.unit_to_ints {
            expect(unit, DocKind::Unit, "unit_to_ints")?;
            ints.provides
                .iter()
                .chain(&ints.consumes)
                .try_for_each(|i| expect(i, DocKind::Int, "unit_to_ints"))?;
        }
        Ok(())
    }

    /// INT -> REQs that list it, from `req_to_ints`.
    pub fn int_to_reqs(&self) -> BTreeMap<DocId, BTreeSet<DocId>> {
        invert(&self.req_to_ints)
    }

    /// UNIT -> REQs allocated to it, from `req_to_units`.
    pub fn unit_to_reqs(&self) -> BTreeMap<DocId, BTreeSet<DocId>> {
        invert(&self.req_to_units)
    }

    /// INT -> providing and consuming units, from `unit_to_ints`.
    ///
    /// Units appear in ascending id order.
    pub fn int_parties(&self) -> BTreeMap<DocId, Parties> {
        let mut parties: BTreeMap<DocId, Parties> = BTreeMap::new();
        for (unit, ints) in &self.unit_to_ints {
            for int in &ints.provides {
                push_unique(&mut parties.entry(int.clone()).or_default().providers, unit);
            }
            for int in &ints.consumes {
                push_unique(&mut parties.entry(int.clone()).or_default().consumers, unit);
            }
        }
        parties
    }
}

fn push_unique(list: &mut Vec<DocId>, id: &DocId) {
    if !list.contains(id) {
        list.push(id.clone());
    }
}

fn invert(forward: &BTreeMap<DocId, Vec<DocId>>) -> BTreeMap<DocId, BTreeSet<DocId>> {
    let mut inverse: BTreeMap<DocId, BTreeSet<DocId>> = BTreeMap::new();
    for (from, targets) in forward {
        for to in targets {
            inverse.entry(to.clone()).or_default().insert(from.clone());
        }
    }
    inverse
}

/// Traceability table errors.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error(transparent)]
    Read(#[from] FsError),

    #[error("invalid traceability tables {origin} at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    Parse {
        origin: String,
        line: Option<usize>,
        message: String,
    },

    #[error("{id} in {table} must be a {expected} id")]
    WrongKind {
        id: DocId,
        expected: DocKind,
        table: &'static str,
    },
}
