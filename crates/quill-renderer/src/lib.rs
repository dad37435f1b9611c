//! Markdown renderer with mdBook-style directives.
//!
//! This crate renders Markdown to HTML with pulldown-cmark and adds two
//! extensions on top:
//!
//! - [`include`]: `{{#include file.rs:2:3}}` directives that pull whole
//!   files, line ranges or anchored regions of other files into a code block
//! - [`hidelines`]: removal of hidden lines from code blocks
//!
//! # Architecture
//!
//! Code blocks are rendered by a chain of [`FenceRenderer`] stages. Each
//! stage owns the next one; the chain always ends in a [`BackendFence`],
//! which writes markup through a [`RenderBackend`] such as [`HtmlBackend`].
//! Everything else is written by pulldown-cmark's HTML writer.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use quill_renderer::{HtmlBackend, MarkdownRenderer, RenderEnv};
//!
//! let renderer = MarkdownRenderer::<HtmlBackend>::new().with_book_extensions(HashMap::new());
//! let result = renderer.render("# Hello\n\n**Bold** text", &RenderEnv::default());
//! assert!(result.html.starts_with("<h1>Hello</h1>"));
//! ```

mod backend;
mod escape;
mod fence;
pub mod hidelines;
mod html;
pub mod include;
mod renderer;

pub use backend::RenderBackend;
pub use escape::escape_html;
pub use fence::{BackendFence, Fence, FenceBody, FenceContext, FenceRenderer};
pub use hidelines::{FenceInfo, HiddenLineFilter, parse_info};
pub use html::HtmlBackend;
pub use renderer::{MarkdownRenderer, RenderEnv, RenderResult};
