//! User-story extraction from speckit feature specifications.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use syskit_doc::{Markdown, ParseError};
use tracing::warn;

struct StoryPatterns {
    story_heading: Regex,
    counted_heading: Regex,
    priority: Regex,
    as_a: Regex,
    want: Regex,
    so_that: Regex,
    plain_story: Regex,
    acceptance: Regex,
    list_item: Regex,
}

static PATTERNS: LazyLock<StoryPatterns> = LazyLock::new(|| StoryPatterns {
    story_heading: Regex::new(r"^(US-\d+)\b(?::\s*(.*))?").expect("valid pattern"),
    counted_heading: Regex::new(r"###\s+US-\d+:").expect("valid pattern"),
    priority: Regex::new(r"\*\*Priority:\*\*\s*(P[123]|Essential|Important|Nice-to-have)")
        .expect("valid pattern"),
    as_a: Regex::new(r"(?is)\*\*As a\*\*\s+(.+?)(?:\*\*I want|\z)").expect("valid pattern"),
    want: Regex::new(r"(?is)\*\*I want(?: to)?\*\*\s+(.+?)(?:\*\*So that|\z)")
        .expect("valid pattern"),
    so_that: Regex::new(r"(?is)\*\*So that\*\*\s+(.+?)(?:\*\*|\z)").expect("valid pattern"),
    plain_story: Regex::new(r"(?is)(As a.*?(?:so that|\.))").expect("valid pattern"),
    acceptance: Regex::new(r"(?s)\*\*Acceptance Criteria:\*\*(.*?)(?:\*\*|###|\z)")
        .expect("valid pattern"),
    list_item: Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(.*)$").expect("valid pattern"),
});

/// Requirement priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Priority {
    Essential,
    #[default]
    Important,
    NiceToHave,
}

impl Priority {
    /// Parse `P1`..`P3` or a priority name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "P1" | "Essential" => Some(Self::Essential),
            "P2" | "Important" => Some(Self::Important),
            "P3" | "Nice-to-have" => Some(Self::NiceToHave),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Essential => "Essential",
            Self::Important => "Important",
            Self::NiceToHave => "Nice-to-have",
        })
    }
}

/// A user story from a feature specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStory {
    /// Story id, e.g. `US-3`.
    pub story: String,
    pub title: String,
    /// 1-based line of the story heading.
    pub line: usize,
    pub priority: Priority,
    /// Normalized "As a ..., I want to ..., so that ..." sentence.
    pub narrative: String,
    pub acceptance: Vec<String>,
}

impl UserStory {
    /// Verification text for the generated requirement.
    pub fn verification(&self) -> String {
        if self.acceptance.is_empty() {
            return "**Demonstration:** TBD - Define specific verification steps".to_string();
        }
        let mut text = String::from(
            "**Demonstration:** The system SHALL meet the following acceptance criteria:\n\n",
        );
        for criterion in &self.acceptance {
            text.push_str("- ");
            text.push_str(criterion);
            text.push('\n');
        }
        text.trim_end().to_string()
    }
}

/// Extract every `### US-n: Title` story from a feature specification.
pub fn extract_user_stories(source: &str) -> Result<Vec<UserStory>, ExtractError> {
    let markdown = Markdown::parse(source)?;
    let patterns = &*PATTERNS;
    let mut stories = Vec::new();

    for section in markdown.sections().iter().filter(|s| s.level >= 3) {
        let Some(caps) = patterns.story_heading.captures(&section.heading) else {
            continue;
        };
        let story = caps[1].to_string();
        let Some(title) = caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .filter(|t| !t.is_empty())
        else {
            warn!(story = %story, line = section.line, "User story heading has no title, skipping");
            continue;
        };

        let body = source[section.body_span.clone()].trim();
        stories.push(UserStory {
            priority: priority(body),
            narrative: narrative(body).unwrap_or_else(|| title.clone()),
            acceptance: acceptance_criteria(body),
            story,
            title,
            line: section.line,
        });
    }

    Ok(stories)
}

/// Number of `### US-n:` headings in `source`.
pub fn count_user_stories(source: &str) -> usize {
    PATTERNS.counted_heading.find_iter(source).count()
}

fn priority(body: &str) -> Priority {
    PATTERNS
        .priority
        .captures(body)
        .and_then(|caps| Priority::parse(&caps[1]))
        .unwrap_or_default()
}

fn single_line(s: &str) -> String {
    s.trim().replace('\n', " ")
}

fn narrative(body: &str) -> Option<String> {
    let patterns = &*PATTERNS;
    let as_a = patterns.as_a.captures(body);
    let want = patterns.want.captures(body);

    if let (Some(as_a), Some(want)) = (as_a, want) {
        let as_a = single_line(&as_a[1]);
        let want = single_line(&want[1]);
        let so_that = patterns
            .so_that
            .captures(body)
            .map(|caps| single_line(&caps[1]))
            .filter(|s| !s.is_empty());

        return Some(match so_that {
            Some(so_that) => format!("As a {as_a}, I want to {want}, so that {so_that}"),
            None => format!("As a {as_a}, I want to {want}"),
        });
    }

    patterns
        .plain_story
        .captures(body)
        .map(|caps| caps[1].trim().to_string())
}

fn acceptance_criteria(body: &str) -> Vec<String> {
    let Some(caps) = PATTERNS.acceptance.captures(body) else {
        return Vec::new();
    };

    let mut criteria: Vec<String> = Vec::new();
    let mut in_item = false;
    for line in caps[1].lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            in_item = false;
            continue;
        }
        match PATTERNS.list_item.captures(line) {
            Some(item) => {
                criteria.push(item[1].trim().to_string());
                in_item = true;
            }
            None if in_item => {
                if let Some(last) = criteria.last_mut() {
                    last.push(' ');
                    last.push_str(trimmed);
                }
            }
            None => {
                criteria.push(trimmed.to_string());
                in_item = true;
            }
        }
    }
    criteria.retain(|c| !c.is_empty());
    criteria
}

/// Extraction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEATURE_SPEC: &str = r#"# Feature Specification: SPI GPU

## User Scenarios

### US-1: Basic Host Communication

**Priority:** P1

**As a** firmware developer
**I want to** send register writes over SPI
**So that** the GPU can be configured from the host

**Acceptance Criteria:**
- Register writes are acknowledged
- Reads return the last written
  value for every register
1. Flow control stalls the host

### US-2: Framebuffer Management

**Priority:** P3

As a user I need double buffering so that frames never tear.

### US-3: Display Output

Nothing structured here.

## Requirements

### FR-1: SPI Electrical Interface
"#;

    #[test]
    fn test_extract_stories_in_order() {
        let stories = extract_user_stories(FEATURE_SPEC).unwrap();
        let ids: Vec<_> = stories.iter().map(|s| s.story.as_str()).collect();
        assert_eq!(ids, vec!["US-1", "US-2", "US-3"]);
        assert_eq!(stories[0].title, "Basic Host Communication");
        assert_eq!(stories[0].line, 5);
    }

    #[test]
    fn test_priority_mapping() {
        let stories = extract_user_stories(FEATURE_SPEC).unwrap();
        assert_eq!(stories[0].priority, Priority::Essential);
        assert_eq!(stories[1].priority, Priority::NiceToHave);
        assert_eq!(stories[2].priority, Priority::Important);
        assert_eq!(Priority::NiceToHave.to_string(), "Nice-to-have");
    }

    #[test]
    fn test_bold_narrative_normalized() {
        let stories = extract_user_stories(FEATURE_SPEC).unwrap();
        assert_eq!(
            stories[0].narrative,
            "As a firmware developer, I want to send register writes over SPI, \
             so that the GPU can be configured from the host"
        );
    }

    #[test]
    fn test_narrative_fallbacks() {
        let stories = extract_user_stories(FEATURE_SPEC).unwrap();
        assert_eq!(
            stories[1].narrative,
            "As a user I need double buffering so that"
        );
        assert_eq!(stories[2].narrative, "Display Output");
    }

    #[test]
    fn test_acceptance_criteria() {
        let stories = extract_user_stories(FEATURE_SPEC).unwrap();
        assert_eq!(
            stories[0].acceptance,
            vec![
                "Register writes are acknowledged",
                "Reads return the last written value for every register",
                "Flow control stalls the host",
            ]
        );
        assert!(stories[1].acceptance.is_empty());
    }

    #[test]
    fn test_verification_text() {
        let stories = extract_user_stories(FEATURE_SPEC).unwrap();
        assert!(stories[0].verification().starts_with(
            "**Demonstration:** The system SHALL meet the following acceptance criteria:\n\n- Register"
        ));
        assert_eq!(
            stories[1].verification(),
            "**Demonstration:** TBD - Define specific verification steps"
        );
    }

    #[test]
    fn test_untitled_story_is_skipped() {
        let stories =
            extract_user_stories("# Spec\n\n### US-4\n\nBody\n\n### US-5: Titled\n\nBody\n")
                .unwrap();
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].story, "US-5");
        assert_eq!(stories[0].line, 7);
    }

    #[test]
    fn test_count_user_stories() {
        assert_eq!(count_user_stories(FEATURE_SPEC), 3);
        assert_eq!(count_user_stories("### US-1 without colon\n"), 0);
    }
}
