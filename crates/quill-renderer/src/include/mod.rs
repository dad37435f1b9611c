//! File inclusion.
//!
//! A directive block such as `{{#include src/main.rs:anchor}}` is recognized
//! by [`IncludeBlockRule`] on the parser's event stream, rendered as an
//! include [`Fence`](crate::Fence), and resolved by [`IncludeRenderer`].
//!
//! Included files are inserted as code and are never parsed for further
//! directives, Markdown files included.

mod block;
mod directive;
mod error;
mod region;
mod render;
mod source;

pub use block::{BlockEvent, IncludeBlockRule};
pub use directive::{DirectiveKind, IncludeDirective, LineSelection, Selection, parse_directive};
pub use error::IncludeError;
pub use region::{Region, find_lines, find_lines_with_anchor, find_region, split_lines};
pub use render::{IncludeRenderer, ResolutionContext};
pub use source::{FileSource, FsSource};
