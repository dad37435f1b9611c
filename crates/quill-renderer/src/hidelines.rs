//! Hidden lines in code blocks.
//!
//! Lines starting with a hide prefix are dropped from the rendered block, so
//! examples can carry setup code that readers do not need to see:
//!
//! ````markdown
//! ```python,hidelines=!!!
//! !!!import helpers
//! helpers.run()
//! ```
//! ````
//!
//! The prefix comes from the `hidelines=` attribute of the info string, then
//! from the per-language configuration, then from the built-in defaults.

use std::collections::HashMap;

use crate::fence::{Fence, FenceBody, FenceContext, FenceRenderer};

/// Languages with a hide prefix out of the box.
const BUILTIN_PREFIXES: &[(&str, &str)] = &[("rust", "#")];

/// Parsed fence info string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FenceInfo {
    /// Language, the first comma-separated item.
    pub lang: String,
    /// Value of a `hidelines=` attribute, if present.
    pub hidelines: Option<String>,
}

/// Parse an info string of the form `lang,attr=value,...`.
///
/// ```
/// use quill_renderer::parse_info;
///
/// let info = parse_info("python,hidelines=!!!");
/// assert_eq!(info.lang, "python");
/// assert_eq!(info.hidelines.as_deref(), Some("!!!"));
/// ```
#[must_use]
pub fn parse_info(info: &str) -> FenceInfo {
    let mut parts = info.trim().split(',');
    let lang = parts.next().unwrap_or("").trim().to_owned();
    let hidelines = parts
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim() == "hidelines")
        .map(|(_, value)| value.trim().to_owned());
    FenceInfo { lang, hidelines }
}

/// Fence stage that drops hidden lines.
pub struct HiddenLineFilter {
    prefixes: HashMap<String, String>,
    next: Box<dyn FenceRenderer>,
}

impl HiddenLineFilter {
    /// Create the stage with per-language prefixes.
    ///
    /// Entries in `prefixes` override the built-in defaults.
    pub fn new(prefixes: HashMap<String, String>, next: Box<dyn FenceRenderer>) -> Self {
        let mut merged: HashMap<String, String> = BUILTIN_PREFIXES
            .iter()
            .map(|&(lang, prefix)| (lang.to_owned(), prefix.to_owned()))
            .collect();
        merged.extend(prefixes);
        Self {
            prefixes: merged,
            next,
        }
    }

    /// Hide prefix for a block, if any.
    fn prefix<'a>(&'a self, info: &'a FenceInfo) -> Option<&'a str> {
        info.hidelines
            .as_deref()
            .filter(|prefix| !prefix.is_empty())
            .or_else(|| self.prefixes.get(&info.lang).map(String::as_str))
            .filter(|prefix| !prefix.is_empty())
    }
}

impl FenceRenderer for HiddenLineFilter {
    fn render(&self, mut fence: Fence, cx: &mut FenceContext<'_>, out: &mut String) {
        let FenceBody::Code(code) = &fence.body else {
            self.next.render(fence, cx, out);
            return;
        };

        let info = parse_info(&fence.info);
        let Some(prefix) = self.prefix(&info) else {
            self.next.render(fence, cx, out);
            return;
        };

        let visible = code
            .split('\n')
            .filter(|line| !line.trim().starts_with(prefix))
            .collect::<Vec<_>>()
            .join("\n");
        fence.body = FenceBody::Code(visible);
        fence.info = info.lang;
        self.next.render(fence, cx, out);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::HtmlBackend;
    use crate::fence::BackendFence;
    use crate::renderer::RenderEnv;

    fn filter(prefixes: &[(&str, &str)]) -> HiddenLineFilter {
        let prefixes = prefixes
            .iter()
            .map(|&(lang, prefix)| (lang.to_owned(), prefix.to_owned()))
            .collect();
        HiddenLineFilter::new(prefixes, Box::new(BackendFence::<HtmlBackend>::new()))
    }

    fn render(stage: &HiddenLineFilter, info: &str, code: &str) -> String {
        let env = RenderEnv::default();
        let mut cx = FenceContext::new(&env);
        let mut out = String::new();
        stage.render(Fence::code(info, code), &mut cx, &mut out);
        out
    }

    #[test]
    fn test_parse_info_lang_only() {
        assert_eq!(
            parse_info("rust"),
            FenceInfo {
                lang: "rust".to_owned(),
                hidelines: None,
            }
        );
    }

    #[test]
    fn test_parse_info_with_hidelines() {
        let info = parse_info("python,ignore, hidelines=!!!");
        assert_eq!(info.lang, "python");
        assert_eq!(info.hidelines.as_deref(), Some("!!!"));
    }

    #[test]
    fn test_parse_info_empty() {
        assert_eq!(parse_info(""), FenceInfo::default());
    }

    #[test]
    fn test_local_prefix_matches_plain_block() {
        let stage = filter(&[]);
        let hidden = render(&stage, "python,hidelines=!!!", "a\n!!!secret\nb");
        let plain = render(&stage, "python", "a\nb");
        assert_eq!(hidden, plain);
        assert_eq!(
            plain,
            "<pre><code class=\"language-python\">a\nb</code></pre>\n"
        );
    }

    #[test]
    fn test_builtin_rust_prefix() {
        let out = render(&filter(&[]), "rust", "# use std::fmt;\nfn main() {}\n");
        assert_eq!(
            out,
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_configured_prefix() {
        let out = render(&filter(&[("python", "~")]), "python", "~import os\nprint(1)");
        assert_eq!(
            out,
            "<pre><code class=\"language-python\">print(1)</code></pre>\n"
        );
    }

    #[test]
    fn test_configured_prefix_overrides_builtin() {
        let out = render(&filter(&[("rust", "@")]), "rust", "# keep\n@hide\n");
        assert!(out.contains("# keep"));
        assert!(!out.contains("@hide"));
    }

    #[test]
    fn test_local_prefix_overrides_config() {
        let out = render(
            &filter(&[("python", "~")]),
            "python,hidelines=%",
            "~shown\n%hidden",
        );
        assert!(out.contains("~shown"));
        assert!(!out.contains("%hidden"));
    }

    #[test]
    fn test_indented_hidden_line() {
        let out = render(&filter(&[]), "rust", "fn f() {\n    # let x = 1;\n}");
        assert!(!out.contains("let x"));
    }

    #[test]
    fn test_no_prefix_untouched() {
        let out = render(&filter(&[]), "toml,extra", "# comment\n");
        assert_eq!(
            out,
            "<pre><code class=\"language-toml\"># comment\n</code></pre>\n"
        );
    }

    #[test]
    fn test_include_fence_passes_through() {
        let stage = filter(&[]);
        let env = RenderEnv::default();
        let mut cx = FenceContext::new(&env);
        let mut out = String::new();
        let directive = crate::include::parse_directive("{{#include lib.rs}}").unwrap();
        stage.render(Fence::include(directive), &mut cx, &mut out);
        assert!(out.contains("lib.rs"));
    }
}
