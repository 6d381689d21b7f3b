use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while processing a case, split so a broken
/// pipeline is never mistaken for a wrong rendering (that distinction lives
/// in [`crate::pipeline::Verdict`], not here).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown test case: {name}")]
    CaseNotFound { name: String },

    #[error("failed to create workspace under {root}: {source}")]
    WorkspaceCreation {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The render-or-convert step failed; surfaces a converter defect and is
    /// propagated verbatim.
    #[error(transparent)]
    Conversion(#[from] plotink_figure::Error),

    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external tool exited non-zero; carries its combined stdout+stderr.
    #[error("{tool} failed ({status}); captured output:\n{output}")]
    Toolchain {
        tool: String,
        status: ExitStatus,
        output: String,
    },

    #[error("{tool} did not finish within {timeout:?} and was killed")]
    ToolchainTimeout { tool: String, timeout: Duration },

    /// The rasterizer exited zero but the expected page file never appeared.
    #[error("rasterizer reported success but produced no {path}")]
    MissingArtifact { path: PathBuf },

    #[error("invalid fingerprint {text:?}: expected {expected} lowercase hex characters")]
    InvalidFingerprint { text: String, expected: usize },

    #[error("failed to decode raster image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Headless diagnostics are part of the test obligation, so a failed
    /// upload fails the case.
    #[error("diagnostic upload of {path} failed: {detail}")]
    DiagnosticUpload { path: PathBuf, detail: String },

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
