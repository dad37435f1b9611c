//! Include directive matcher.
//!
//! Recognizes a single line of the form `{{#include path/to/file.ext:sel}}`
//! and normalizes the selector into an [`IncludeDirective`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Captures: keyword, path, extension, anchor, start selector, end selector.
static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*\{\{#(include|rustdoc_include|playground)\s([^<>|:"*?]+\.([a-z0-9]+))(?::([A-Za-z][\w-]*)|(:\d*)(:\d*)?)?\}\}\s*$"#,
    )
    .unwrap()
});

/// Directive family. Only affects how the resolved block is decorated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// `{{#include ...}}`
    Include,
    /// `{{#rustdoc_include ...}}`
    RustdocInclude,
    /// `{{#playground ...}}`
    Playground,
}

impl DirectiveKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "include" => Some(Self::Include),
            "rustdoc_include" => Some(Self::RustdocInclude),
            "playground" => Some(Self::Playground),
            _ => None,
        }
    }

    /// Keyword as written after `{{#`.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::RustdocInclude => "rustdoc_include",
            Self::Playground => "playground",
        }
    }

    /// Class added to the rendered block, if any.
    #[must_use]
    pub fn class(self) -> Option<&'static str> {
        match self {
            Self::Include => None,
            Self::RustdocInclude => Some("rustdoc-include"),
            Self::Playground => Some("playground"),
        }
    }
}

/// Line-based selection.
///
/// Indices are 0-based and `end` is inclusive. In exclude mode the span
/// `[start, end]` is removed and everything else is kept. Values produced by
/// [`parse_directive`] are never negative; hand-built selections may be, and
/// are rejected at extraction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineSelection {
    /// First selected line.
    pub start: i64,
    /// Last selected line (inclusive).
    pub end: i64,
    /// Remove the span instead of keeping it.
    pub exclude: bool,
}

impl LineSelection {
    /// Selection covering the whole file.
    pub const WHOLE_FILE: Self = Self {
        start: 0,
        end: 0,
        exclude: false,
    };

    /// Keep lines `start..=end`.
    #[must_use]
    pub fn keep(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            exclude: false,
        }
    }

    /// Drop lines `start..=end`.
    #[must_use]
    pub fn exclude(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            exclude: true,
        }
    }

    /// All-zero keep selection means "include the entire file".
    #[must_use]
    pub fn is_whole_file(&self) -> bool {
        *self == Self::WHOLE_FILE
    }

    /// Normalize the raw `:N` / `:M` captures (colons included).
    ///
    /// Returns `None` when a number does not fit.
    fn from_captures(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        let start = start.map(|s| s.trim_start_matches(':'));
        let end = end.map(|s| s.trim_start_matches(':'));

        // `:N:` drops the lines before N
        if let (Some(start), Some("")) = (start, end)
            && !start.is_empty()
        {
            let n: i64 = start.parse().ok()?;
            return Some(if n == 0 {
                Self::WHOLE_FILE
            } else {
                Self::exclude(0, n - 1)
            });
        }

        let start = match start {
            Some(s) if !s.is_empty() => s.parse().ok()?,
            _ => 0,
        };
        // A missing end selects the single start line
        let end = match end {
            Some(s) if !s.is_empty() => s.parse().ok()?,
            _ => start,
        };
        Some(Self::keep(start, end))
    }
}

impl fmt::Display for LineSelection {
    /// Writes the selector in its shortest surface form.
    ///
    /// Exclude spans that do not start at line 0 have no surface syntax and
    /// are written as a plain range.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exclude && self.start == 0 {
            write!(f, ":{}:", self.end + 1)
        } else if self.is_whole_file() {
            Ok(())
        } else if self.start == self.end {
            write!(f, ":{}", self.start)
        } else if self.start == 0 {
            write!(f, "::{}", self.end)
        } else {
            write!(f, ":{}:{}", self.start, self.end)
        }
    }
}

/// What part of the file a directive selects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Lines between `ANCHOR: name` and `ANCHOR_END: name` markers.
    Anchor(String),
    /// Line range, possibly in exclude mode.
    Lines(LineSelection),
}

impl Selection {
    /// Whether the file is used verbatim.
    #[must_use]
    pub fn is_whole_file(&self) -> bool {
        matches!(self, Self::Lines(lines) if lines.is_whole_file())
    }
}

/// Parsed include directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncludeDirective {
    /// Directive family.
    pub kind: DirectiveKind,
    /// Referenced path, relative to the resolution directory or absolute.
    pub path: String,
    /// Language inferred from the file extension.
    pub lang: String,
    /// Selected part of the file.
    pub selection: Selection,
}

impl fmt::Display for IncludeDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{#{} {}", self.kind.keyword(), self.path)?;
        match &self.selection {
            Selection::Anchor(name) => write!(f, ":{name}")?,
            Selection::Lines(lines) => write!(f, "{lines}")?,
        }
        f.write_str("}}")
    }
}

/// Match one line of Markdown against the include grammar.
///
/// Returns `None` when the line is not a directive.
///
/// # Example
///
/// ```
/// use quill_renderer::include::{LineSelection, Selection, parse_directive};
///
/// let directive = parse_directive("{{#include src/main.rs:5:}}").unwrap();
/// assert_eq!(directive.lang, "rs");
/// assert_eq!(directive.selection, Selection::Lines(LineSelection::exclude(0, 4)));
/// ```
#[must_use]
pub fn parse_directive(line: &str) -> Option<IncludeDirective> {
    let caps = INCLUDE_RE.captures(line)?;
    let kind = DirectiveKind::from_keyword(caps.get(1)?.as_str())?;
    let path = caps.get(2)?.as_str().to_owned();
    let lang = caps.get(3)?.as_str().to_owned();

    let selection = if let Some(anchor) = caps.get(4) {
        Selection::Anchor(anchor.as_str().to_owned())
    } else {
        Selection::Lines(LineSelection::from_captures(
            caps.get(5).map(|m| m.as_str()),
            caps.get(6).map(|m| m.as_str()),
        )?)
    };

    Some(IncludeDirective {
        kind,
        path,
        lang,
        selection,
    })
}
