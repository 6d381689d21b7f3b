//! Mismatch diagnostics: the human-readable report and headless artifact
//! uploads.
//!
//! When there is no interactive display, uploaded artifacts substitute for
//! visual inspection, so in that mode the uploads are part of the test
//! obligation; a failed upload fails the case rather than degrading to
//! best-effort.

use crate::fingerprint::Fingerprint;
use crate::toolchain::run_tool;
use crate::workspace::Workspace;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// When to upload diagnostic artifacts on a mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadPolicy {
    /// Upload only in headless environments (no `DISPLAY`).
    #[default]
    Auto,
    Always,
    Never,
}

impl UploadPolicy {
    pub fn should_upload(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::env::var_os("DISPLAY").is_none(),
        }
    }
}

/// One uploaded artifact and where it ended up.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedArtifact {
    pub path: PathBuf,
    pub url: String,
}

/// Uploads files to an external paste/share endpoint via a `curl`-compatible
/// command (`<command> -sT <file> <endpoint>`, stdout is the public URL).
#[derive(Debug, Clone)]
pub struct Uploader {
    pub command: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for Uploader {
    fn default() -> Self {
        Self {
            command: "curl".to_string(),
            endpoint: "chunk.io".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl Uploader {
    /// Upload one file, returning the share URL.
    pub fn upload(&self, path: &Path) -> Result<UploadedArtifact> {
        let file = path.to_string_lossy();
        let cwd = path.parent().unwrap_or_else(|| Path::new("."));
        let output = run_tool(
            &self.command,
            &["-sT", file.as_ref(), &self.endpoint],
            cwd,
            self.timeout,
        )
        .map_err(|err| {
            let detail = match err {
                Error::Toolchain { output, status, .. } => {
                    format!("uploader exited with {status}: {}", output.trim())
                }
                Error::ToolchainTimeout { timeout, .. } => {
                    format!("uploader timed out after {timeout:?}")
                }
                other => other.to_string(),
            };
            Error::DiagnosticUpload {
                path: path.to_path_buf(),
                detail,
            }
        })?;

        let url = output.trim().to_string();
        tracing::debug!(path = %path.display(), %url, "uploaded diagnostic artifact");
        Ok(UploadedArtifact {
            path: path.to_path_buf(),
            url,
        })
    }
}

/// Print the mismatch report and, when the policy calls for it, upload the
/// compiled document, the rasterized page, and the native reference — in
/// that fixed order.
pub(crate) fn report_mismatch(
    workspace: &Workspace,
    computed: Fingerprint,
    expected: Fingerprint,
    policy: UploadPolicy,
    uploader: &Uploader,
) -> Result<Vec<UploadedArtifact>> {
    let distance = computed.hamming_distance(expected);
    println!("Output file: {}", workspace.raster_path().display());
    println!("computed fingerprint:  {computed}");
    println!("expected fingerprint: {expected}");
    println!("Hamming distance: {distance} (out of {})", Fingerprint::BITS);

    if !policy.should_upload() {
        return Ok(Vec::new());
    }

    let artifacts = [
        ("output PDF", workspace.document_path()),
        ("output PNG", workspace.raster_path()),
        ("reference PDF", workspace.reference_path()),
    ];
    let mut uploads = Vec::with_capacity(artifacts.len());
    for (what, path) in artifacts {
        println!("Uploading {what} file to {}...", uploader.endpoint);
        let uploaded = uploader.upload(&path)?;
        println!("{}", uploaded.url);
        uploads.push(uploaded);
    }
    Ok(uploads)
}
