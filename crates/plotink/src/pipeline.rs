//! Per-case orchestration and the batch loop.
//!
//! One case flows through: render → convert to TikZ → save native reference
//! → wrap → compile → rasterize → fingerprint → verdict. The precomputed
//! expected fingerprint is the correctness oracle; the native reference PDF
//! is rendered by an entirely separate path and kept only for human
//! comparison after a failure.

use crate::config::HarnessConfig;
use crate::diagnostics::{self, UploadedArtifact, Uploader};
use crate::fingerprint::Fingerprint;
use crate::registry::{CaseRegistry, TestCase};
use crate::toolchain::{self, Toolchain};
use crate::workspace::{Workspace, WorkspaceManager};
use crate::{Error, Result};
use plotink_figure::tikz::{self, TikzOptions};
use serde::Serialize;
use std::path::PathBuf;

/// Pass/fail outcome of one case whose pipeline completed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum Verdict {
    Pass {
        case: String,
        fingerprint: Fingerprint,
    },
    Fail {
        case: String,
        computed: Fingerprint,
        expected: Fingerprint,
        /// Diagnostic severity only; the pass decision is equality.
        distance: u32,
        max_distance: u32,
        artifacts: CaseArtifacts,
        uploads: Vec<UploadedArtifact>,
    },
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    pub fn case(&self) -> &str {
        match self {
            Self::Pass { case, .. } | Self::Fail { case, .. } => case,
        }
    }
}

/// Where a failed case left its artifacts for post-mortem inspection.
#[derive(Debug, Clone, Serialize)]
pub struct CaseArtifacts {
    pub markup: PathBuf,
    pub document: PathBuf,
    pub raster: PathBuf,
    pub reference: PathBuf,
}

impl CaseArtifacts {
    fn of(workspace: &Workspace) -> Self {
        Self {
            markup: workspace.markup_path(),
            document: workspace.document_path(),
            raster: workspace.raster_path(),
            reference: workspace.reference_path(),
        }
    }
}

/// Outcome of one case in a batch: a verdict, or the pipeline error that
/// kept the case from reaching one.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CaseOutcome {
    Verdict(Verdict),
    Error { case: String, error: String },
}

impl CaseOutcome {
    pub fn case(&self) -> &str {
        match self {
            Self::Verdict(verdict) => verdict.case(),
            Self::Error { case, .. } => case,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Verdict(verdict) if verdict.is_pass())
    }
}

/// Result of a whole batch run.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<CaseOutcome>,
}

impl BatchReport {
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(CaseOutcome::is_pass)
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_pass()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }
}

/// Drives test cases through the full pipeline.
pub struct Harness {
    config: HarnessConfig,
    workspaces: WorkspaceManager,
    toolchain: Toolchain,
    uploader: Uploader,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        let workspaces = config.workspace_manager();
        let toolchain = config.toolchain();
        let uploader = config.uploader_handle();
        Self {
            config,
            workspaces,
            toolchain,
            uploader,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run one case end to end.
    ///
    /// `Ok(Verdict::Fail)` means the pipeline worked and the output looked
    /// wrong; `Err` means the pipeline itself broke (conversion defect,
    /// toolchain failure, mandatory diagnostics upload failure, ...).
    pub fn run_case(&self, case: &dyn TestCase) -> Result<Verdict> {
        let expected: Fingerprint = case.expected_fingerprint().parse()?;
        let workspace = self.workspaces.create(case.name())?;
        tracing::debug!(case = case.name(), workspace = %workspace.dir().display(), "running case");

        // Render and convert. Failures here surface converter defects and
        // are deliberately not caught.
        let figure = case.render();
        let markup = tikz::render(
            &figure,
            &TikzOptions {
                figure_width: self.config.figure_width.clone(),
                annotate: false,
            },
        )?;
        let markup_path = workspace.markup_path();
        std::fs::write(&markup_path, &markup).map_err(|source| Error::Io {
            action: "write markup to",
            path: markup_path.clone(),
            source,
        })?;

        // Independent ground-truth baseline, retained for human comparison.
        plotink_figure::native::save_reference(&figure, &workspace.reference_path())?;

        let markup_name = markup_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let wrapper_path = workspace.wrapper_path();
        std::fs::write(&wrapper_path, toolchain::wrapper_document(&markup_name)).map_err(
            |source| Error::Io {
                action: "write wrapper to",
                path: wrapper_path.clone(),
                source,
            },
        )?;

        self.toolchain.compile_to_document(&workspace)?;
        let raster = self.toolchain.rasterize(&workspace)?;

        let computed = Fingerprint::of_image(&raster)?;
        let distance = computed.hamming_distance(expected);
        if distance <= self.config.max_distance {
            return Ok(Verdict::Pass {
                case: case.name().to_string(),
                fingerprint: computed,
            });
        }

        let uploads = diagnostics::report_mismatch(
            &workspace,
            computed,
            expected,
            self.config.upload,
            &self.uploader,
        )?;
        Ok(Verdict::Fail {
            case: case.name().to_string(),
            computed,
            expected,
            distance,
            max_distance: Fingerprint::BITS,
            artifacts: CaseArtifacts::of(&workspace),
            uploads,
        })
    }

    /// Run every registered case sequentially.
    ///
    /// Cases share no mutable state, so a failure (or pipeline error) in one
    /// never aborts its siblings.
    pub fn run_all(&self, registry: &CaseRegistry) -> BatchReport {
        let mut outcomes = Vec::with_capacity(registry.len());
        for (name, case) in registry.iter() {
            println!("{name}");
            let outcome = match self.run_case(case.as_ref()) {
                Ok(verdict) => CaseOutcome::Verdict(verdict),
                Err(error) => {
                    println!("error: {error}");
                    CaseOutcome::Error {
                        case: name.to_string(),
                        error: error.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }
        BatchReport { outcomes }
    }
}
