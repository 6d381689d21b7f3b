//! Harness configuration.

use crate::diagnostics::{UploadPolicy, Uploader};
use crate::toolchain::Toolchain;
use crate::workspace::WorkspaceManager;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Knobs for one harness run. Every field has a sensible default, so a JSON
/// config file only needs the overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Physical width handed to the TikZ converter.
    pub figure_width: String,
    /// Raster resolution for the toolchain rasterizer.
    pub dpi: u32,
    /// TeX compiler binary.
    pub compiler: String,
    /// PDF rasterizer binary.
    pub rasterizer: String,
    /// Deadline per external tool invocation, in seconds.
    pub tool_timeout_secs: u64,
    /// Upload command (`curl`-compatible CLI).
    pub uploader: String,
    /// Paste/share endpoint for headless diagnostics.
    pub upload_endpoint: String,
    pub upload: UploadPolicy,
    /// Root for per-case workspaces; system temp dir when unset.
    pub workspace_root: Option<PathBuf>,
    /// Accepted-pass band on the Hamming distance. Shipped default is 0:
    /// the hash algorithm's own noise tolerance is the only slack.
    pub max_distance: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            figure_width: "7.5cm".to_string(),
            dpi: 600,
            compiler: "pdflatex".to_string(),
            rasterizer: "pdftoppm".to_string(),
            tool_timeout_secs: 120,
            uploader: "curl".to_string(),
            upload_endpoint: "chunk.io".to_string(),
            upload: UploadPolicy::Auto,
            workspace_root: None,
            max_distance: 0,
        }
    }
}

impl HarnessConfig {
    /// Load a config from a JSON file. Unknown keys are rejected so typos
    /// fail loudly instead of silently keeping a default.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub(crate) fn toolchain(&self) -> Toolchain {
        Toolchain {
            compiler: self.compiler.clone(),
            rasterizer: self.rasterizer.clone(),
            dpi: self.dpi,
            timeout: Duration::from_secs(self.tool_timeout_secs),
        }
    }

    pub(crate) fn uploader_handle(&self) -> Uploader {
        Uploader {
            command: self.uploader.clone(),
            endpoint: self.upload_endpoint.clone(),
            timeout: Duration::from_secs(self.tool_timeout_secs),
        }
    }

    pub(crate) fn workspace_manager(&self) -> WorkspaceManager {
        match &self.workspace_root {
            Some(root) => WorkspaceManager::new(root),
            None => WorkspaceManager::default(),
        }
    }
}
