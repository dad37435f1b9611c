//! Line and anchor region extraction.
//!
//! Anchors are comment markers placed in the included file:
//!
//! ```text
//! // ANCHOR: setup
//! let x = 1;
//! // ANCHOR_END: setup
//! ```
//!
//! The marker syntax differs per language, so markers are matched against a
//! table of comment idioms. The first idiom that marks the requested region is
//! used for the rest of the scan.

use std::sync::LazyLock;

use regex::Regex;

use super::directive::LineSelection;
use super::error::IncludeError;

/// Comment idioms for anchor markers, as `(family, pattern)`.
///
/// Each pattern captures the tag (`ANCHOR` or `ANCHOR_END`) and the region
/// name, and is matched against a trimmed line.
const ANCHOR_PATTERNS: &[(&str, &str)] = &[
    // JavaScript, TypeScript, Java, Rust, C
    ("line-comment", r"^//+\s?#?(ANCHOR(?:_END)?):\s*([\w-]+)$"),
    // CSS, Less, Sass, Rust, C
    ("block-comment", r"^/\*\s?#?(ANCHOR(?:_END)?):\s*([\w-]+)\s?\*/$"),
    // C, C++
    ("pragma", r"^#pragma (ANCHOR(?:_END)?):\s*([\w-]+)$"),
    // HTML, Markdown, XML
    ("html-comment", r"^<!--\s?#?(ANCHOR(?:_END)?):\s*([\w-]+)\s?-->$"),
    // Visual Basic
    ("visual-basic", r"^'\s?#?(ANCHOR(?:_END)?):\s*([\w-]+)$"),
    // Batch files
    ("batch", r"^(?:::|REM)\s?#?(ANCHOR(?:_END)?):\s*([\w-]+)$"),
    // C#, PHP, PowerShell, Python, Perl, shell and friends
    ("hash-comment", r"^#\s?(ANCHOR(?:_END)?):\s*([\w-]+)$"),
    // SQL, Lua, Haskell
    ("double-dash", r"^--\s?#?(ANCHOR(?:_END)?):\s*([\w-]+)$"),
];

static ANCHOR_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    ANCHOR_PATTERNS
        .iter()
        .map(|(family, pattern)| (*family, Regex::new(pattern).unwrap()))
        .collect()
});

/// Marker tag found on an anchor line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tag {
    Begin,
    End,
}

/// Match `line` against one idiom, returning the tag if it marks `name`.
fn marker(re: &Regex, line: &str, name: &str) -> Option<Tag> {
    let caps = re.captures(line)?;
    if caps.get(2)?.as_str() != name {
        return None;
    }
    match caps.get(1)?.as_str() {
        "ANCHOR" => Some(Tag::Begin),
        "ANCHOR_END" => Some(Tag::End),
        _ => None,
    }
}

/// Boundaries of an anchored region: `start` inclusive, `end` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// Line after the begin marker.
    pub start: usize,
    /// Line of the end marker.
    pub end: usize,
}

/// Split file text into lines, treating `\r\n` as `\n`.
///
/// A trailing newline yields a final empty line, so joining the result with
/// `\n` restores the normalized text.
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Select lines by index range.
///
/// In keep mode returns `lines[start..=end]`; in exclude mode returns every
/// line outside that span, order preserved. Indices past the end of the file
/// are clamped.
///
/// # Errors
///
/// Returns [`IncludeError::InvalidRange`] if `start` or `end` is negative.
pub fn find_lines<'a>(
    lines: &[&'a str],
    selection: LineSelection,
) -> Result<Vec<&'a str>, IncludeError> {
    let LineSelection {
        start,
        end,
        exclude,
    } = selection;
    let (Ok(first), Ok(last)) = (usize::try_from(start), usize::try_from(end)) else {
        return Err(IncludeError::InvalidRange { start, end });
    };

    let selected = if exclude {
        lines
            .iter()
            .enumerate()
            .filter(|(i, _)| !(first..=last).contains(i))
            .map(|(_, line)| *line)
            .collect()
    } else {
        let stop = last.saturating_add(1).min(lines.len());
        lines.get(first..stop).map(<[_]>::to_vec).unwrap_or_default()
    };
    Ok(selected)
}

/// Locate the region named `name`.
///
/// Returns `None` if the begin marker or the matching end marker is missing.
#[must_use]
pub fn find_region(lines: &[&str], name: &str) -> Option<Region> {
    let mut idiom: Option<&(&str, Regex)> = None;
    let mut start = None;

    for (i, line) in lines.iter().enumerate() {
        let line = line.trim();
        let tag = if let Some((_, re)) = idiom {
            marker(re, line, name)
        } else {
            let found = ANCHOR_RES
                .iter()
                .find_map(|entry| marker(&entry.1, line, name).map(|tag| (entry, tag)));
            found.map(|(entry, tag)| {
                idiom = Some(entry);
                tag
            })
        };

        match tag {
            Some(Tag::Begin) => start = Some(i + 1),
            Some(Tag::End) => {
                if let Some(start) = start {
                    return Some(Region { start, end: i });
                }
            }
            None => {}
        }
    }

    if let Some((family, _)) = idiom {
        tracing::debug!(anchor = name, family, "Anchor region not terminated");
    }
    None
}

/// Select the lines of the region named `name`.
///
/// Marker lines are not part of the result. A missing or unterminated region
/// yields an empty vector.
#[must_use]
pub fn find_lines_with_anchor<'a>(lines: &[&'a str], name: &str) -> Vec<&'a str> {
    find_region(lines, name)
        .and_then(|region| lines.get(region.start..region.end))
        .map(<[_]>::to_vec)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const TEN_LINES: [&str; 10] = [
        "line 0", "line 1", "line 2", "line 3", "line 4", "line 5", "line 6", "line 7", "line 8",
        "line 9",
    ];

    const COMPONENT_FILE: &str = "\
use std::fmt;

struct Position(i32, i32);
// ANCHOR: component
#[derive(Debug)]
struct Velocity(i32, i32);
impl Velocity {}
// ANCHOR_END: component

// ANCHOR: system
fn movement() {}
// ANCHOR_END: system
";

    #[test]
    fn test_find_lines_keep() {
        let selected = find_lines(&TEN_LINES, LineSelection::keep(2, 3)).unwrap();
        assert_eq!(selected, vec!["line 2", "line 3"]);
    }

    #[test]
    fn test_find_lines_single_line() {
        let selected = find_lines(&TEN_LINES, LineSelection::keep(5, 5)).unwrap();
        assert_eq!(selected, vec!["line 5"]);
    }

    #[test]
    fn test_find_lines_exclude() {
        let selected = find_lines(&TEN_LINES, LineSelection::exclude(2, 3)).unwrap();
        assert_eq!(selected.len(), TEN_LINES.len() - 2);
        assert_eq!(
            selected,
            vec![
                "line 0", "line 1", "line 4", "line 5", "line 6", "line 7", "line 8", "line 9"
            ]
        );
    }

    #[test]
    fn test_find_lines_exclude_prefix() {
        let selected = find_lines(&TEN_LINES, LineSelection::exclude(0, 6)).unwrap();
        assert_eq!(selected, vec!["line 7", "line 8", "line 9"]);
    }

    #[test]
    fn test_find_lines_end_past_file_is_clamped() {
        let selected = find_lines(&TEN_LINES, LineSelection::keep(8, 100)).unwrap();
        assert_eq!(selected, vec!["line 8", "line 9"]);
    }

    #[test]
    fn test_find_lines_start_past_file_is_empty() {
        let selected = find_lines(&TEN_LINES, LineSelection::keep(20, 30)).unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn test_find_lines_reversed_range_is_empty() {
        let selected = find_lines(&TEN_LINES, LineSelection::keep(5, 2)).unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn test_find_lines_negative_start() {
        let err = find_lines(&TEN_LINES, LineSelection::keep(-1, 3)).unwrap_err();
        assert!(matches!(
            err,
            IncludeError::InvalidRange { start: -1, end: 3 }
        ));
    }

    #[test]
    fn test_find_lines_negative_end() {
        let result = find_lines(&TEN_LINES, LineSelection::exclude(0, -1));
        assert!(matches!(result, Err(IncludeError::InvalidRange { .. })));
    }

    #[test]
    fn test_anchor_region() {
        let lines = split_lines(COMPONENT_FILE);
        assert_eq!(
            find_lines_with_anchor(&lines, "component"),
            vec![
                "#[derive(Debug)]",
                "struct Velocity(i32, i32);",
                "impl Velocity {}"
            ]
        );
        assert_eq!(find_lines_with_anchor(&lines, "system"), vec!["fn movement() {}"]);
    }

    #[test]
    fn test_anchor_region_boundaries() {
        let mut lines: Vec<&str> = vec!["a"; 10];
        lines[3] = "// ANCHOR: component";
        lines[7] = "// ANCHOR_END: component";
        assert_eq!(
            find_region(&lines, "component"),
            Some(Region { start: 4, end: 7 })
        );
        assert_eq!(find_lines_with_anchor(&lines, "component").len(), 3);
    }

    #[test]
    fn test_anchor_missing_is_empty() {
        let lines = split_lines(COMPONENT_FILE);
        assert!(find_lines_with_anchor(&lines, "all").is_empty());
    }

    #[test]
    fn test_anchor_unterminated_is_empty() {
        let lines = split_lines("// ANCHOR: open\nlet a = 1;\n");
        assert!(find_lines_with_anchor(&lines, "open").is_empty());
    }

    #[test]
    fn test_anchor_end_before_begin_is_ignored() {
        let lines = split_lines("// ANCHOR_END: r\nx\n// ANCHOR: r\ny\n// ANCHOR_END: r\n");
        assert_eq!(find_lines_with_anchor(&lines, "r"), vec!["y"]);
    }

    #[test]
    fn test_anchor_idioms() {
        let cases = [
            ("/* #ANCHOR: r */", "/* #ANCHOR_END: r */"),
            ("/* ANCHOR: r */", "/* ANCHOR_END: r */"),
            ("#pragma ANCHOR: r", "#pragma ANCHOR_END: r"),
            ("<!-- ANCHOR: r -->", "<!-- ANCHOR_END: r -->"),
            ("' ANCHOR: r", "' ANCHOR_END: r"),
            ("'#ANCHOR: r", "'#ANCHOR_END: r"),
            (":: ANCHOR: r", ":: ANCHOR_END: r"),
            ("REM ANCHOR: r", "REM ANCHOR_END: r"),
            ("# ANCHOR: r", "# ANCHOR_END: r"),
            ("-- ANCHOR: r", "-- ANCHOR_END: r"),
        ];
        for (begin, end) in cases {
            let lines = vec!["before", begin, "inside", end, "after"];
            assert_eq!(
                find_lines_with_anchor(&lines, "r"),
                vec!["inside"],
                "idiom {begin}"
            );
        }
    }

    #[test]
    fn test_anchor_indented_markers() {
        let lines = vec![
            "fn main() {",
            "    // ANCHOR: body",
            "    run();",
            "    // ANCHOR_END: body",
            "}",
        ];
        assert_eq!(find_lines_with_anchor(&lines, "body"), vec!["    run();"]);
    }

    #[test]
    fn test_anchor_idiom_is_locked_in() {
        // The begin marker uses `//`, so a `#` end marker is not recognized
        let lines = vec!["// ANCHOR: r", "inside", "# ANCHOR_END: r", "more"];
        assert!(find_lines_with_anchor(&lines, "r").is_empty());
    }

    #[test]
    fn test_anchor_other_regions_ignored() {
        let lines = split_lines(
            "// ANCHOR: outer\na\n// ANCHOR: inner\nb\n// ANCHOR_END: inner\nc\n// ANCHOR_END: outer\n",
        );
        assert_eq!(
            find_lines_with_anchor(&lines, "outer"),
            vec!["a", "// ANCHOR: inner", "b", "// ANCHOR_END: inner", "c"]
        );
    }

    #[test]
    fn test_split_lines_normalizes_crlf() {
        assert_eq!(split_lines("a\r\nb\r\n"), vec!["a", "b", ""]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
    }
}
