//! HTML backend for code block rendering.

use std::fmt::Write;

use crate::backend::RenderBackend;
use crate::escape::escape_html;

/// HTML render backend.
///
/// Produces `<pre><code class="language-x">` blocks. Extra classes land on
/// the `<pre>` element so themes can style playground or rustdoc blocks.
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    fn code_block(lang: Option<&str>, classes: &[String], content: &str, out: &mut String) {
        out.push_str("<pre");
        if !classes.is_empty() {
            write!(out, r#" class="{}""#, escape_html(&classes.join(" "))).unwrap();
        }
        out.push('>');
        if let Some(lang) = lang {
            write!(
                out,
                r#"<code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(content)
            )
            .unwrap();
        } else {
            write!(out, "<code>{}</code></pre>", escape_html(content)).unwrap();
        }
        out.push('\n');
    }
}
