//! Per-case scratch workspaces.
//!
//! Each case run owns a unique directory plus a base file prefix inside it.
//! Artifact paths derive from that base with a fixed suffix scheme the
//! external tools rely on:
//!
//! | suffix | artifact |
//! |---|---|
//! | `_tikz.tex` | converted TikZ markup |
//! | `.tex` | standalone wrapper document |
//! | `.pdf` | compiled document (compiler jobname output) |
//! | `-1.png` | first rasterized page |
//! | `_reference.pdf` | native baseline rendering |
//!
//! Workspaces are never removed automatically; failed runs leave their
//! artifacts behind for post-mortem inspection.

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Allocates collision-free workspaces under a fixed root.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl Default for WorkspaceManager {
    fn default() -> Self {
        Self {
            root: std::env::temp_dir(),
        }
    }
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a fresh workspace whose directory name starts with
    /// `name_hint` (sanitized) to aid debugging.
    ///
    /// Uniqueness comes from the randomized directory suffix, so two
    /// concurrently created workspaces with the same hint never collide.
    /// Filesystem failures propagate as [`Error::WorkspaceCreation`] and are
    /// never retried.
    pub fn create(&self, name_hint: &str) -> Result<Workspace> {
        let creation_error = |source| Error::WorkspaceCreation {
            root: self.root.clone(),
            source,
        };
        std::fs::create_dir_all(&self.root).map_err(creation_error)?;

        let hint = sanitize_hint(name_hint);
        let dir = tempfile::Builder::new()
            .prefix(&format!("{hint}-"))
            .tempdir_in(&self.root)
            .map_err(creation_error)?
            // Kept deliberately: artifacts must survive the run.
            .keep();
        let base = dir.join(&hint);
        tracing::debug!(workspace = %dir.display(), "created workspace");
        Ok(Workspace { dir, base })
    }
}

/// An isolated scratch area owned by exactly one case execution.
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
    base: PathBuf,
}

impl Workspace {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The base path all artifact paths are suffixed from.
    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn markup_path(&self) -> PathBuf {
        self.suffixed("_tikz.tex")
    }

    pub fn wrapper_path(&self) -> PathBuf {
        self.suffixed(".tex")
    }

    pub fn document_path(&self) -> PathBuf {
        self.suffixed(".pdf")
    }

    pub fn raster_path(&self) -> PathBuf {
        self.suffixed("-1.png")
    }

    pub fn reference_path(&self) -> PathBuf {
        self.suffixed("_reference.pdf")
    }

    fn suffixed(&self, suffix: &str) -> PathBuf {
        let mut path = self.base.clone().into_os_string();
        path.push(suffix);
        PathBuf::from(path)
    }
}

/// Keep hints filesystem-safe; anything exotic becomes `-`.
fn sanitize_hint(hint: &str) -> String {
    let cleaned: String = hint
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "case".to_string()
    } else {
        cleaned
    }
}
