#![forbid(unsafe_code)]

//! Visual-regression harness for a declarative plot → TikZ converter.
//!
//! Each test case renders a [`plotink_figure::Figure`], which the harness
//! converts to pgfplots markup, compiles with an external TeX toolchain,
//! rasterizes to PNG, and checks against the case's accepted 64-bit
//! perceptual fingerprint. The perceptual hash absorbs antialiasing, font
//! substitution, and rounding noise across toolchain versions; byte- or
//! pixel-exact comparison does not survive those.
//!
//! ```no_run
//! use plotink::{CaseRegistry, FnCase, Harness, HarnessConfig};
//! use plotink_figure::{Axes, Figure, Series};
//!
//! fn simple_line() -> Figure {
//!     let mut axes = Axes::new();
//!     axes.push_series(Series::line(vec![(0.0, 0.0), (1.0, 1.0)]));
//!     Figure::single(axes)
//! }
//!
//! let mut registry = CaseRegistry::new();
//! registry.register(FnCase::new("simple_line", "af3c91e0b4d2f718", simple_line));
//!
//! let harness = Harness::new(HarnessConfig::default());
//! let report = harness.run_all(&registry);
//! assert!(report.all_passed());
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fingerprint;
pub mod pipeline;
pub mod registry;
pub mod toolchain;
pub mod workspace;

pub use config::HarnessConfig;
pub use diagnostics::{UploadPolicy, UploadedArtifact, Uploader};
pub use error::{Error, Result};
pub use fingerprint::Fingerprint;
pub use pipeline::{BatchReport, CaseArtifacts, CaseOutcome, Harness, Verdict};
pub use registry::{CaseRegistry, FnCase, TestCase};
pub use toolchain::Toolchain;
pub use workspace::{Workspace, WorkspaceManager};
