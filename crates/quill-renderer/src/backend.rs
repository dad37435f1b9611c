//! Render backend trait for format-specific code block output.
//!
//! Everything except code blocks is rendered by pulldown-cmark's HTML writer.
//! Code blocks go through the fence chain, whose innermost stage hands the
//! final fence to a [`RenderBackend`].

/// Backend trait for format-specific rendering operations.
pub trait RenderBackend {
    /// Render a code block.
    ///
    /// # Arguments
    ///
    /// * `lang` - Optional language identifier (e.g., "rust", "rs")
    /// * `classes` - Extra classes for the outer element (e.g., "playground")
    /// * `content` - The code content
    /// * `out` - Output buffer to write to
    fn code_block(lang: Option<&str>, classes: &[String], content: &str, out: &mut String);
}
