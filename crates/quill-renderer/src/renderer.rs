//! Markdown renderer driving pulldown-cmark and the fence chain.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::PathBuf;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Tag, TagEnd};

use crate::backend::RenderBackend;
use crate::fence::{BackendFence, Fence, FenceContext, FenceRenderer};
use crate::hidelines::HiddenLineFilter;
use crate::include::{BlockEvent, FileSource, FsSource, IncludeBlockRule, IncludeRenderer};

/// Per-call environment passed to [`MarkdownRenderer::render`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderEnv {
    /// Absolute directory (or file within it) that include paths are
    /// relative to.
    pub cwd: Option<PathBuf>,
}

impl RenderEnv {
    /// Environment resolving includes against `cwd`.
    #[must_use]
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
        }
    }
}

/// Result of rendering markdown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered HTML.
    pub html: String,
    /// Warnings generated during conversion (e.g., unresolved includes).
    pub warnings: Vec<String>,
}

/// Markdown renderer with a configurable fence chain.
///
/// Everything except code blocks is rendered by pulldown-cmark's HTML
/// writer. Code blocks are turned into [`Fence`] values and passed through
/// the chain, which ends in a [`BackendFence`] for `B`.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use quill_renderer::{HtmlBackend, MarkdownRenderer, RenderEnv};
///
/// let renderer = MarkdownRenderer::<HtmlBackend>::new().with_hidden_lines(HashMap::new());
/// let result = renderer.render("```rust\n# use std::fmt;\nfn main() {}\n```\n", &RenderEnv::default());
/// assert_eq!(
///     result.html,
///     "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
/// );
/// ```
pub struct MarkdownRenderer<B: RenderBackend> {
    gfm: bool,
    chain: Box<dyn FenceRenderer>,
    _backend: PhantomData<fn() -> B>,
}

impl<B: RenderBackend + 'static> MarkdownRenderer<B> {
    /// Create a new renderer with GFM enabled and no extensions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gfm: true,
            chain: Box::new(BackendFence::<B>::new()),
            _backend: PhantomData,
        }
    }
}

impl<B: RenderBackend + 'static> Default for MarkdownRenderer<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Wrap the current fence chain in a new stage.
    ///
    /// `build` receives the chain so far and returns the stage that owns it.
    /// The stage added last sees fences first.
    ///
    /// # Example
    ///
    /// ```
    /// use quill_renderer::include::{FsSource, IncludeRenderer};
    /// use quill_renderer::{HtmlBackend, MarkdownRenderer};
    ///
    /// let renderer = MarkdownRenderer::<HtmlBackend>::new().with_stage(|next| {
    ///     IncludeRenderer::new(FsSource, next).with_cwd(|_| std::env::current_dir().ok())
    /// });
    /// ```
    #[must_use]
    pub fn with_stage<S, F>(mut self, build: F) -> Self
    where
        S: FenceRenderer + 'static,
        F: FnOnce(Box<dyn FenceRenderer>) -> S,
    {
        let next = std::mem::replace(&mut self.chain, Box::new(Passthrough));
        self.chain = Box::new(build(next));
        self
    }

    /// Add the hidden-line stage with per-language prefixes.
    #[must_use]
    pub fn with_hidden_lines(self, prefixes: HashMap<String, String>) -> Self {
        self.with_stage(|next| HiddenLineFilter::new(prefixes, next))
    }

    /// Add the include stage reading files from `source`.
    #[must_use]
    pub fn with_includes(self, source: impl FileSource + 'static) -> Self {
        self.with_stage(|next| IncludeRenderer::new(source, next))
    }

    /// Add both book extensions: hidden lines, then includes from the local
    /// file system.
    ///
    /// Included content therefore also has its hidden lines removed.
    #[must_use]
    pub fn with_book_extensions(self, hidelines: HashMap<String, String>) -> Self {
        self.with_hidden_lines(hidelines).with_includes(FsSource)
    }

    /// Render markdown to HTML.
    ///
    /// Never fails: include problems are reported inline and in
    /// [`RenderResult::warnings`].
    #[must_use]
    pub fn render(&self, markdown: &str, env: &RenderEnv) -> RenderResult {
        let blocks = IncludeBlockRule::new(self.parser_options()).parse(markdown);
        let mut cx = FenceContext::new(env);
        let mut events: Vec<Event<'_>> = Vec::with_capacity(blocks.len());
        let mut open: Option<OpenBlock> = None;

        for block in blocks {
            let event = match block {
                BlockEvent::Include(directive) => {
                    let mut html = String::new();
                    self.chain.render(Fence::include(directive), &mut cx, &mut html);
                    events.push(Event::Html(CowStr::from(html)));
                    continue;
                }
                BlockEvent::Markdown(event) => event,
            };

            if open.is_some() {
                match event {
                    Event::Text(text) => {
                        if let Some(block) = open.as_mut() {
                            block.content.push_str(&text);
                        }
                    }
                    Event::End(TagEnd::CodeBlock) => {
                        if let Some(block) = open.take() {
                            let mut html = String::new();
                            self.chain.render(block.into_fence(), &mut cx, &mut html);
                            events.push(Event::Html(CowStr::from(html)));
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    open = Some(match kind {
                        CodeBlockKind::Fenced(info) => OpenBlock {
                            info: info.into_string(),
                            content: String::new(),
                        },
                        CodeBlockKind::Indented => OpenBlock::default(),
                    });
                }
                other => events.push(other),
            }
        }

        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, events.into_iter());
        RenderResult {
            html,
            warnings: cx.into_warnings(),
        }
    }
}

/// Code block being collected from the event stream.
#[derive(Default)]
struct OpenBlock {
    info: String,
    content: String,
}

impl OpenBlock {
    fn into_fence(self) -> Fence {
        Fence::code(self.info, self.content)
    }
}

/// Placeholder chain while a stage is being swapped in.
struct Passthrough;

impl FenceRenderer for Passthrough {
    fn render(&self, _fence: Fence, _cx: &mut FenceContext<'_>, _out: &mut String) {}
}
