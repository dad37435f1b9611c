//! Fence renderer chain.
//!
//! Code blocks are rendered by a chain of [`FenceRenderer`] stages. Each stage
//! owns the next stage and decides whether to rewrite the fence before handing
//! it on. The innermost stage is [`BackendFence`], which writes the final
//! markup through a [`RenderBackend`].
//!
//! ```text
//! IncludeRenderer -> HiddenLineFilter -> BackendFence<HtmlBackend>
//! ```

use std::marker::PhantomData;

use crate::backend::RenderBackend;
use crate::include::IncludeDirective;
use crate::renderer::RenderEnv;

/// Content of a fenced block, decided once at parse time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FenceBody {
    /// Literal code written in the document.
    Code(String),
    /// Placeholder for an include directive, resolved by the include stage.
    Include(IncludeDirective),
}

/// A fenced code block travelling through the fence chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fence {
    /// Raw info string (e.g. `rust`, `python,hidelines=!!!`).
    pub info: String,
    /// Extra classes for the rendered block.
    pub classes: Vec<String>,
    /// Block content.
    pub body: FenceBody,
}

impl Fence {
    /// Create a fence holding literal code.
    #[must_use]
    pub fn code(info: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            info: info.into(),
            classes: Vec::new(),
            body: FenceBody::Code(content.into()),
        }
    }

    /// Create a fence standing in for an include directive.
    ///
    /// The info string carries the inferred language until the include stage
    /// replaces the body.
    #[must_use]
    pub fn include(directive: IncludeDirective) -> Self {
        Self {
            info: directive.lang.clone(),
            classes: Vec::new(),
            body: FenceBody::Include(directive),
        }
    }

    /// Language from the info string: text up to the first comma or space.
    #[must_use]
    pub fn lang(&self) -> Option<&str> {
        let lang = self
            .info
            .trim()
            .split(|c: char| c == ',' || c.is_whitespace())
            .next()
            .unwrap_or("");
        if lang.is_empty() { None } else { Some(lang) }
    }
}

/// Per-render state shared by all stages.
pub struct FenceContext<'a> {
    env: &'a RenderEnv,
    warnings: Vec<String>,
}

impl<'a> FenceContext<'a> {
    /// Create a context for one render call.
    #[must_use]
    pub fn new(env: &'a RenderEnv) -> Self {
        Self {
            env,
            warnings: Vec::new(),
        }
    }

    /// Render environment supplied by the caller.
    #[must_use]
    pub fn env(&self) -> &'a RenderEnv {
        self.env
    }

    /// Record a warning for the render result.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Warnings recorded so far.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consume the context and return its warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}

/// One stage of the fence chain.
///
/// Implementations that wrap another stage take it at construction time and
/// call it once they are done with the fence.
pub trait FenceRenderer: Send + Sync {
    /// Render `fence` into `out`.
    fn render(&self, fence: Fence, cx: &mut FenceContext<'_>, out: &mut String);
}

/// Innermost stage: writes the fence through a [`RenderBackend`].
///
/// An include fence reaching this stage (no include stage configured)
/// renders its literal path.
pub struct BackendFence<B> {
    _backend: PhantomData<fn() -> B>,
}

impl<B: RenderBackend> BackendFence<B> {
    /// Create the backend stage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _backend: PhantomData,
        }
    }
}

impl<B: RenderBackend> Default for BackendFence<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: RenderBackend> FenceRenderer for BackendFence<B> {
    fn render(&self, fence: Fence, _cx: &mut FenceContext<'_>, out: &mut String) {
        let content = match &fence.body {
            FenceBody::Code(code) => code.as_str(),
            FenceBody::Include(directive) => directive.path.as_str(),
        };
        B::code_block(fence.lang(), &fence.classes, content, out);
    }
}
