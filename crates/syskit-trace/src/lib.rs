//! Traceability linking.
//!
//! The forward tables in [`TraceTables`] are the single source of truth for
//! REQ, INT and UNIT relationships. The [`Establisher`] writes them, and
//! their inverses, into the pending traceability sections of the corpus.

pub mod establish;
pub mod render;
pub mod tables;

pub use establish::{establish, EstablishError, Establisher, LinkReport, Pass, PassReport};
pub use render::TitleIndex;
pub use tables::{Parties, TableError, TraceTables, UnitInterfaces, BUILTIN_TABLES};
