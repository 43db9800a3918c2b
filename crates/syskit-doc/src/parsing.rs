//! Parser for the markdown subset used by syskit documents.
//!
//! The parser only understands ATX headings and fenced code blocks. Every
//! heading below the document title opens a [`Section`]; everything else is
//! section body text. Bodies that start with the `TBD` sentinel parse as
//! [`SectionBody::Pending`].

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::id::DocId;

/// Sentinel text marking an unresolved section on disk.
pub const PLACEHOLDER: &str = "TBD";

static PATTERNS: LazyLock<ParserPatterns> = LazyLock::new(ParserPatterns::new);

struct ParserPatterns {
    heading: Regex,
    titled: Regex,
}

impl ParserPatterns {
    fn new() -> Self {
        Self {
            heading: Regex::new(r"^(#{1,6})\s+(.*?)\s*$").expect("heading pattern is valid"),
            titled: Regex::new(r"^([A-Z]+-\d+):\s+(.+)$").expect("title pattern is valid"),
        }
    }
}

/// Body of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum SectionBody {
    /// Unresolved placeholder; `note` is whatever followed the sentinel on its line.
    Pending { note: String },
    /// No text before the next heading.
    Empty,
    /// Resolved text, trimmed.
    Content(String),
}

impl SectionBody {
    /// Placeholder with an explanatory note.
    pub fn pending(note: impl Into<String>) -> Self {
        Self::Pending { note: note.into() }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    fn classify(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.strip_prefix(PLACEHOLDER) {
            Some(rest) => {
                let first_line = rest.lines().next().unwrap_or_default();
                Self::Pending {
                    note: first_line.trim().to_string(),
                }
            }
            None => Self::Content(trimmed.to_string()),
        }
    }
}

/// Renders the on-disk form. `Pending` becomes the sentinel line.
impl fmt::Display for SectionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending { note } if note.is_empty() => f.write_str(PLACEHOLDER),
            Self::Pending { note } => write!(f, "{PLACEHOLDER} {note}"),
            Self::Empty => Ok(()),
            Self::Content(text) => f.write_str(text),
        }
    }
}

/// A heading and the text under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading level (2 for `##`).
    pub level: usize,
    /// Heading text, trimmed.
    pub heading: String,
    /// 1-based line of the heading.
    pub line: usize,
    /// Byte range of the text up to the next heading of any level.
    pub body_span: Range<usize>,
    /// Byte range up to the next heading of the same or a higher level,
    /// so nested subsections are included.
    pub extent: Range<usize>,
    pub body: SectionBody,
}

/// First-line document heading such as `# REQ-001: Basic Host Communication`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub text: String,
    pub line: usize,
}

/// Parsed markdown text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markdown {
    heading: Option<Heading>,
    sections: Vec<Section>,
    source: String,
}

impl Markdown {
    /// Parse `source`.
    pub fn parse(source: impl Into<String>) -> Result<Self, ParseError> {
        let source = source.into();
        let patterns = &*PATTERNS;

        let mut fences = FenceTracker::default();
        let mut heading = None;
        let mut sections: Vec<Section> = Vec::new();
        let mut offset = 0;

        for (index, line) in source.split_inclusive('\n').enumerate() {
            let line_num = index + 1;
            let start = offset;
            offset += line.len();
            let text = line.trim_end_matches(['\n', '\r']);

            if fences.feed(text, line_num) {
                continue;
            }

            let Some(caps) = patterns.heading.captures(text) else {
                continue;
            };
            let level = caps[1].len();
            let heading_text = caps[2].to_string();

            if level == 1 && heading.is_none() && sections.is_empty() {
                heading = Some(Heading {
                    text: heading_text,
                    line: line_num,
                });
                continue;
            }

            if let Some(last) = sections.last_mut() {
                last.body_span.end = start;
            }
            for open in sections.iter_mut().rev() {
                if open.extent.end == usize::MAX && open.level >= level {
                    open.extent.end = start;
                }
            }

            sections.push(Section {
                level,
                heading: heading_text,
                line: line_num,
                body_span: offset..source.len(),
                extent: offset..usize::MAX,
                body: SectionBody::Empty,
            });
        }

        fences.finish()?;

        for section in &mut sections {
            if section.extent.end == usize::MAX {
                section.extent.end = source.len();
            }
            section.body = SectionBody::classify(&source[section.body_span.clone()]);
        }

        Ok(Self {
            heading,
            sections,
            source,
        })
    }

    /// The document heading, if the first heading is a level-1 heading.
    pub fn heading(&self) -> Option<&Heading> {
        self.heading.as_ref()
    }

    /// Id declared by an `# ID: Title` heading.
    pub fn heading_id(&self) -> Option<DocId> {
        let heading = self.heading.as_ref()?;
        let caps = PATTERNS.titled.captures(&heading.text)?;
        caps[1].parse().ok()
    }

    /// Title declared by an `# ID: Title` heading.
    pub fn title(&self) -> Option<&str> {
        let heading = self.heading.as_ref()?;
        let caps = PATTERNS.titled.captures(&heading.text)?;
        caps.get(2).map(|m| m.as_str().trim())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// First section whose heading is exactly `name`.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading == name)
    }

    /// Text of the first section named `name`, subsections included.
    pub fn section_text(&self, name: &str) -> Option<&str> {
        self.section(name)
            .map(|s| self.source[s.extent.clone()].trim())
    }

    /// Whether `name` exists, is not pending and has text (possibly only in
    /// its subsections).
    pub fn has_content(&self, name: &str) -> bool {
        match self.section(name) {
            Some(section) if section.body.is_pending() => false,
            Some(section) => !self.source[section.extent.clone()].trim().is_empty(),
            None => false,
        }
    }

    /// Replace the placeholder line of the first pending section named
    /// `name` with `replacement`.
    ///
    /// Text after the placeholder line is kept. Returns `Ok(false)` when no
    /// such pending section exists; the source is then unchanged.
    pub fn resolve(&mut self, name: &str, replacement: &str) -> Result<bool, ParseError> {
        let Some(section) = self
            .sections
            .iter()
            .find(|s| s.heading == name && s.body.is_pending())
        else {
            return Ok(false);
        };

        let body = &self.source[section.body_span.clone()];
        let lead = body.len() - body.trim_start().len();
        let start = section.body_span.start + lead;
        let end = self.source[start..section.body_span.end]
            .find('\n')
            .map_or(section.body_span.end, |i| start + i);

        let mut updated = String::with_capacity(self.source.len() + replacement.len());
        updated.push_str(&self.source[..start]);
        updated.push_str(replacement);
        updated.push_str(&self.source[end..]);

        *self = Self::parse(updated)?;
        Ok(true)
    }

    /// Exact source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn into_source(self) -> String {
        self.source
    }
}

const FENCE_MARKERS: [&str; 2] = ["```", "~~~"];

/// Line-by-line tracker for fenced code blocks.
///
/// A block closes only on the marker that opened it, so a ```` ``` ```` line
/// inside a `~~~` block is code.
#[derive(Debug, Clone, Copy, Default)]
pub struct FenceTracker {
    open: Option<(&'static str, usize)>,
}

impl FenceTracker {
    /// Feed the next line. Returns `true` when the line is a fence delimiter
    /// or lies inside a block.
    pub fn feed(&mut self, line: &str, line_num: usize) -> bool {
        let trimmed = line.trim_start();
        let marker = FENCE_MARKERS.into_iter().find(|m| trimmed.starts_with(m));
        match (self.open, marker) {
            (Some((open, _)), Some(m)) if open == m => {
                self.open = None;
                true
            }
            (Some(_), _) => true,
            (None, Some(m)) => {
                self.open = Some((m, line_num));
                true
            }
            (None, None) => false,
        }
    }

    /// Error if a block is still open after the last line.
    pub fn finish(self) -> Result<(), ParseError> {
        match self.open {
            Some((_, line)) => Err(ParseError::UnclosedCodeFence { line }),
            None => Ok(()),
        }
    }
}

/// Parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unclosed code fence opened at line {line}")]
    UnclosedCodeFence { line: usize },
}
