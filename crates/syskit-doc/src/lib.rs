//! Document model for the syskit corpus.
//!
//! Requirements (REQ), interfaces (INT) and design units (UNIT) are markdown
//! files named `<kind>_<number>_<slug>.md`. This crate parses them into
//! sections, tracks unresolved placeholders as [`SectionBody::Pending`] and
//! scans the cross-reference tokens they contain.

pub mod corpus;
pub mod id;
pub mod parsing;
pub mod references;

pub use corpus::{Corpus, CorpusError, DocDirs, Document, Templates};
pub use id::{snake_case, DocId, DocKind, IdError};
pub use parsing::{FenceTracker, Heading, Markdown, ParseError, Section, SectionBody, PLACEHOLDER};
pub use references::{references, references_of};
