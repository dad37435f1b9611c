//! Include block rule.
//!
//! Directives are recognized on pulldown-cmark's block structure rather than
//! on raw lines, so containers behave the way the host parser defines them:
//! a directive alone in a paragraph (or in a tight list item's text) is a
//! directive block, wherever that paragraph sits. List items, blockquotes and
//! nesting are all handled by the parser. Text inside fenced or indented
//! code blocks and raw HTML blocks never forms a paragraph, so directives
//! there stay literal.

use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use super::directive::{IncludeDirective, parse_directive};

/// Event produced by [`IncludeBlockRule::parse`].
#[derive(Clone, Debug, PartialEq)]
pub enum BlockEvent<'a> {
    /// Host parser event, passed through unchanged.
    Markdown(Event<'a>),
    /// Directive block that replaces the events it was recognized from.
    Include(IncludeDirective),
}

/// Block rule recognizing include directives.
///
/// Matching is split in two phases: [`can_start`](Self::can_start) is a
/// cheap check used to skip ordinary text, and [`commit`](Self::commit)
/// runs the full directive grammar.
///
/// # Example
///
/// ```
/// use pulldown_cmark::Options;
/// use quill_renderer::include::{BlockEvent, IncludeBlockRule};
///
/// let events = IncludeBlockRule::new(Options::empty()).parse("Intro\n\n{{#include main.rs::4}}\n");
/// let includes = events
///     .iter()
///     .filter(|e| matches!(e, BlockEvent::Include(_)))
///     .count();
/// assert_eq!(includes, 1);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct IncludeBlockRule {
    options: Options,
}

impl Default for IncludeBlockRule {
    fn default() -> Self {
        Self::new(Options::empty())
    }
}

impl IncludeBlockRule {
    /// Create a block rule that parses with `options`.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Whether the text of a block could be a directive.
    ///
    /// Indentation is measured by the host parser relative to the enclosing
    /// container; text indented into a code block never reaches this check.
    #[must_use]
    pub fn can_start(text: &str) -> bool {
        text.trim_start().starts_with("{{#")
    }

    /// Parse `text` as a directive.
    #[must_use]
    pub fn commit(text: &str) -> Option<IncludeDirective> {
        parse_directive(text)
    }

    /// Parse `source`, replacing directive blocks with [`BlockEvent::Include`].
    #[must_use]
    pub fn parse<'a>(&self, source: &'a str) -> Vec<BlockEvent<'a>> {
        let events: Vec<_> = Parser::new_ext(source, self.options)
            .into_offset_iter()
            .collect();
        let spans = directive_spans(source, &events);
        if !spans.is_empty() {
            tracing::debug!(count = spans.len(), "Recognized include directives");
        }

        let mut spans = spans.into_iter().peekable();
        let mut out = Vec::with_capacity(events.len());
        for (index, (event, _)) in events.into_iter().enumerate() {
            let Some((span, _)) = spans.peek() else {
                out.push(BlockEvent::Markdown(event));
                continue;
            };
            if !span.contains(&index) {
                out.push(BlockEvent::Markdown(event));
            } else if index + 1 == span.end
                && let Some((_, directive)) = spans.next()
            {
                out.push(BlockEvent::Include(directive));
            }
        }
        out
    }
}

/// Event index spans that form directive blocks, in document order.
fn directive_spans(
    source: &str,
    events: &[(Event<'_>, Range<usize>)],
) -> Vec<(Range<usize>, IncludeDirective)> {
    let mut spans = Vec::new();
    let mut index = 0;
    while index < events.len() {
        let text_start = index + 1;
        let text_end = text_run_end(events, text_start);
        let next = events.get(text_end).map(|(e, _)| e);

        let span = match &events[index].0 {
            // Paragraph tags are replaced along with their text.
            Event::Start(Tag::Paragraph)
                if text_end > text_start && matches!(next, Some(Event::End(TagEnd::Paragraph))) =>
            {
                Some(index..text_end + 1)
            }
            // Tight list items have no paragraph; only the text is replaced.
            Event::Start(Tag::Item) if text_end > text_start && next.is_some_and(ends_item_text) => {
                Some(text_start..text_end)
            }
            _ => None,
        };

        if let Some(span) = span
            && let Some(directive) = directive_text(source, &events[text_start..text_end])
        {
            index = span.end;
            spans.push((span, directive));
        } else {
            index += 1;
        }
    }
    spans
}

/// Index one past the run of plain text events starting at `start`.
fn text_run_end(events: &[(Event<'_>, Range<usize>)], start: usize) -> usize {
    events[start.min(events.len())..]
        .iter()
        .position(|(e, _)| !matches!(e, Event::Text(_)))
        .map_or(events.len(), |n| start + n)
}

/// Whether `event` closes the inline text of a tight list item.
fn ends_item_text(event: &Event<'_>) -> bool {
    matches!(
        event,
        Event::End(TagEnd::Item)
            | Event::Rule
            | Event::Start(
                Tag::List(_)
                    | Tag::BlockQuote(_)
                    | Tag::CodeBlock(_)
                    | Tag::HtmlBlock
                    | Tag::Heading { .. }
                    | Tag::Table(_)
            )
    )
}

/// Directive spelled by a run of text events, read from the source.
fn directive_text(source: &str, run: &[(Event<'_>, Range<usize>)]) -> Option<IncludeDirective> {
    let start = run.first()?.1.start;
    let end = run.last()?.1.end;
    let text = source.get(start..end)?;
    if text.contains('\n') || !IncludeBlockRule::can_start(text) {
        return None;
    }
    IncludeBlockRule::commit(text)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::include::{LineSelection, Selection};

    fn includes(source: &str) -> Vec<String> {
        IncludeBlockRule::new(Options::ENABLE_TABLES)
            .parse(source)
            .into_iter()
            .filter_map(|e| match e {
                BlockEvent::Include(d) => Some(d.to_string()),
                BlockEvent::Markdown(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_can_start() {
        assert!(IncludeBlockRule::can_start("{{#include a.rs}}"));
        assert!(IncludeBlockRule::can_start("   {{#include a.rs}}"));
        assert!(IncludeBlockRule::can_start("{{#anything"));
        assert!(!IncludeBlockRule::can_start("text {{#include a.rs}}"));
    }

    #[test]
    fn test_commit() {
        assert!(IncludeBlockRule::commit("{{#include a.rs:2}}").is_some());
        assert!(IncludeBlockRule::commit("{{#include a}}").is_none());
    }

    #[test]
    fn test_parse_replaces_paragraph() {
        let events = IncludeBlockRule::default().parse("# Title\n\n{{#include src/lib.rs:2:3}}\n\nAfter\n");
        let directive = events.iter().find_map(|e| match e {
            BlockEvent::Include(d) => Some(d),
            BlockEvent::Markdown(_) => None,
        });
        assert_eq!(
            directive.map(|d| &d.selection),
            Some(&Selection::Lines(LineSelection::keep(2, 3)))
        );
        let paragraphs = events
            .iter()
            .filter(|e| matches!(e, BlockEvent::Markdown(Event::Start(Tag::Paragraph))))
            .count();
        assert_eq!(paragraphs, 1);
    }

    #[test]
    fn test_parse_without_trailing_newline() {
        assert_eq!(includes("{{#include a.rs}}"), vec!["{{#include a.rs}}"]);
    }

    #[test]
    fn test_parse_crlf() {
        assert_eq!(includes("{{#include a.rs}}\r\ntext\r\n"), Vec::<String>::new());
        assert_eq!(includes("{{#include a.rs}}\r\n\r\ntext\r\n"), vec!["{{#include a.rs}}"]);
    }

    #[test]
    fn test_parse_in_list_items() {
        assert_eq!(includes("- {{#include a.py}}\n- b\n"), vec!["{{#include a.py}}"]);
        assert_eq!(includes("- item\n\n  {{#include a.py}}\n"), vec!["{{#include a.py}}"]);
        assert_eq!(
            includes("- a\n\n  - b\n\n    {{#include a.rs:0}}\n"),
            vec!["{{#include a.rs}}"]
        );
        assert_eq!(
            includes("10. step\n\n    {{#include a.rs:0}}\n"),
            vec!["{{#include a.rs}}"]
        );
    }

    #[test]
    fn test_parse_in_blockquote() {
        assert_eq!(includes("> {{#include a.rs}}\n"), vec!["{{#include a.rs}}"]);
    }

    #[test]
    fn test_parse_skips_fenced_code() {
        assert!(includes("```markdown\n{{#include a.rs}}\n```\n").is_empty());
        assert!(includes("- ```markdown\n  {{#include a.rs}}\n  ```\n").is_empty());
    }

    #[test]
    fn test_parse_skips_indented_code() {
        assert!(includes("    {{#include a.rs}}\n").is_empty());
        assert!(includes("- item\n\n      {{#include a.rs}}\n").is_empty());
    }

    #[test]
    fn test_parse_skips_html_block() {
        assert!(includes("<details>\n{{#include a.rs}}\n</details>\n").is_empty());
    }

    #[test]
    fn test_parse_leaves_non_directives() {
        assert!(includes("{{#include}}\n\n{{#include a.rs}} and *more*\n").is_empty());
        assert!(includes("Intro\n{{#include a.rs}}\n").is_empty());
        assert!(includes("| a |\n|---|\n| {{#include a.rs}} |\n").is_empty());
    }

    #[test]
    fn test_parse_multiple_directives_in_order() {
        assert_eq!(
            includes("{{#include a.rs}}\n\n{{#include b.toml:x}}\n"),
            vec!["{{#include a.rs}}", "{{#include b.toml:x}}"]
        );
    }

    #[test]
    fn test_parse_keeps_other_events() {
        let events = IncludeBlockRule::default().parse("text\n");
        assert_eq!(
            events,
            vec![
                BlockEvent::Markdown(Event::Start(Tag::Paragraph)),
                BlockEvent::Markdown(Event::Text("text".into())),
                BlockEvent::Markdown(Event::End(TagEnd::Paragraph)),
            ]
        );
    }
}
