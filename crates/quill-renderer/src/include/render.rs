//! Include fence stage.
//!
//! Replaces include placeholders with the selected content of the referenced
//! file. Problems with the file never fail the render: they are logged, added
//! to the render warnings and shown inline in the code block.

use std::path::{Path, PathBuf};

use super::directive::{IncludeDirective, Selection};
use super::error::IncludeError;
use super::region::{find_lines, find_lines_with_anchor, split_lines};
use super::source::FileSource;
use crate::fence::{Fence, FenceBody, FenceContext, FenceRenderer};
use crate::renderer::RenderEnv;

/// Prefix of inline error text.
const ERROR_PREFIX: &str = "[quill]";

type CwdAccessor = dyn Fn(&RenderEnv) -> Option<PathBuf> + Send + Sync;

/// Directory that relative include paths are resolved against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionContext {
    dir: PathBuf,
}

impl ResolutionContext {
    /// Build a context from the working directory of the render call.
    ///
    /// A `cwd` naming an existing file is reduced to its parent directory.
    ///
    /// # Errors
    ///
    /// Returns [`IncludeError::Unresolved`] if `cwd` is missing or relative.
    /// `path` is the include path the context is needed for.
    pub fn from_cwd(
        cwd: Option<&Path>,
        source: &dyn FileSource,
        path: &str,
    ) -> Result<Self, IncludeError> {
        let Some(cwd) = cwd.filter(|cwd| cwd.is_absolute()) else {
            return Err(IncludeError::Unresolved(path.to_owned()));
        };

        let dir = if source.exists(cwd) && !source.is_dir(cwd) {
            cwd.parent().unwrap_or(cwd)
        } else {
            cwd
        };
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Base directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve an include path. Absolute paths are returned unchanged.
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.dir.join(path)
    }
}

/// Fence stage that resolves include directives.
///
/// Literal code fences are passed to the next stage untouched.
pub struct IncludeRenderer {
    source: Box<dyn FileSource>,
    cwd: Box<CwdAccessor>,
    next: Box<dyn FenceRenderer>,
}

impl IncludeRenderer {
    /// Create the stage. The working directory is read from
    /// [`RenderEnv::cwd`] unless overridden with [`with_cwd`](Self::with_cwd).
    pub fn new(source: impl FileSource + 'static, next: Box<dyn FenceRenderer>) -> Self {
        Self {
            source: Box::new(source),
            cwd: Box::new(|env: &RenderEnv| env.cwd.clone()),
            next,
        }
    }

    /// Use a custom accessor for the working directory.
    #[must_use]
    pub fn with_cwd(
        mut self,
        accessor: impl Fn(&RenderEnv) -> Option<PathBuf> + Send + Sync + 'static,
    ) -> Self {
        self.cwd = Box::new(accessor);
        self
    }

    /// Read the file named by `directive` and apply its selection.
    ///
    /// # Errors
    ///
    /// Returns an [`IncludeError`] if the file cannot be located or read, or
    /// if the line selection is invalid.
    pub fn resolve(
        &self,
        directive: &IncludeDirective,
        env: &RenderEnv,
    ) -> Result<String, IncludeError> {
        let cwd = (self.cwd)(env);
        let context = ResolutionContext::from_cwd(cwd.as_deref(), &*self.source, &directive.path)?;
        let path = context.resolve(&directive.path);

        if !self.source.exists(&path) {
            return Err(IncludeError::NotFound(path));
        }
        if self.source.is_dir(&path) {
            return Err(IncludeError::NotAFile(path));
        }
        let text = self
            .source
            .read_to_string(&path)
            .map_err(|source| IncludeError::Read {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), directive = %directive, "Resolved include");

        if directive.selection.is_whole_file() {
            return Ok(text);
        }
        let lines = split_lines(&text);
        let selected = match &directive.selection {
            Selection::Anchor(name) => {
                let selected = find_lines_with_anchor(&lines, name);
                if selected.is_empty() {
                    tracing::debug!(path = %path.display(), anchor = %name, "Anchor region is empty or missing");
                }
                selected
            }
            Selection::Lines(selection) => find_lines(&lines, *selection)?,
        };
        Ok(selected.join("\n"))
    }
}

impl FenceRenderer for IncludeRenderer {
    fn render(&self, mut fence: Fence, cx: &mut FenceContext<'_>, out: &mut String) {
        let FenceBody::Include(directive) = fence.body else {
            self.next.render(fence, cx, out);
            return;
        };

        let content = match self.resolve(&directive, cx.env()) {
            Ok(content) => content,
            Err(e @ IncludeError::InvalidRange { .. }) => {
                tracing::error!(directive = %directive, error = %e, "Invalid include selection");
                let message = format!("{ERROR_PREFIX} {e}");
                cx.warn(message.clone());
                message
            }
            Err(e) => {
                tracing::warn!(path = %directive.path, error = %e, "Failed to include file");
                let message = format!("{ERROR_PREFIX} {e}");
                cx.warn(message.clone());
                message
            }
        };

        fence.info.clone_from(&directive.lang);
        if let Some(class) = directive.kind.class() {
            fence.classes.push(class.to_owned());
        }
        fence.body = FenceBody::Code(content);
        self.next.render(fence, cx, out);
    }
}
