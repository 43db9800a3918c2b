//! Document identifiers.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static FILE_STEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(req|int|unit)_(\d+)").expect("file stem pattern is valid"));

/// Kind of syskit document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DocKind {
    /// Requirement.
    Req,
    /// Interface.
    Int,
    /// Design unit.
    Unit,
}

impl DocKind {
    pub const ALL: [DocKind; 3] = [DocKind::Req, DocKind::Int, DocKind::Unit];

    /// Id prefix (`REQ`).
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Req => "REQ",
            Self::Int => "INT",
            Self::Unit => "UNIT",
        }
    }

    /// File name prefix (`req`).
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::Req => "req",
            Self::Int => "int",
            Self::Unit => "unit",
        }
    }

    /// Parse an id prefix such as `UNIT`.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "REQ" => Some(Self::Req),
            "INT" => Some(Self::Int),
            "UNIT" => Some(Self::Unit),
            _ => None,
        }
    }

    fn from_file_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "req" => Some(Self::Req),
            "int" => Some(Self::Int),
            "unit" => Some(Self::Unit),
            _ => None,
        }
    }
}

impl fmt::Display for DocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Identifier of a REQ, INT or UNIT document, e.g. `INT-010`.
///
/// The number keeps its digits verbatim, so `REQ-1` and `REQ-001` are
/// different ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocId {
    kind: DocKind,
    number: String,
}

impl DocId {
    /// Build an id from a kind and a digit string.
    pub fn new(kind: DocKind, number: impl Into<String>) -> Result<Self, IdError> {
        let number = number.into();
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdError::InvalidNumber(number));
        }
        Ok(Self { kind, number })
    }

    /// Parse the id encoded in a file stem or name (`req_001_basic_host.md`).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let caps = FILE_STEM.captures(name)?;
        let kind = DocKind::from_file_prefix(&caps[1])?;
        Some(Self {
            kind,
            number: caps[2].to_string(),
        })
    }

    pub fn kind(&self) -> DocKind {
        self.kind
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    /// Whether this is the `000` template id.
    pub fn is_template(&self) -> bool {
        self.number.bytes().all(|b| b == b'0')
    }

    /// File name for a document with this id and title.
    pub fn file_name(&self, title: &str) -> String {
        format!("{}_{}_{}.md", self.kind.file_prefix(), self.number, snake_case(title))
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.prefix(), self.number)
    }
}

impl FromStr for DocId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, number) = s
            .split_once('-')
            .ok_or_else(|| IdError::Malformed(s.to_string()))?;
        let kind =
            DocKind::from_prefix(prefix).ok_or_else(|| IdError::UnknownPrefix(prefix.to_string()))?;
        Self::new(kind, number)
    }
}

impl TryFrom<String> for DocId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DocId> for String {
    fn from(id: DocId) -> Self {
        id.to_string()
    }
}

/// Id parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("malformed document id: {0}")]
    Malformed(String),

    #[error("unknown document prefix: {0}")]
    UnknownPrefix(String),

    #[error("document number must be digits: {0:?}")]
    InvalidNumber(String),
}

/// Convert a title to the snake_case slug used in file names.
///
/// Characters other than ASCII letters, digits and whitespace are dropped,
/// whitespace runs become `_`.
pub fn snake_case(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}
