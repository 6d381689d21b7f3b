#![forbid(unsafe_code)]

//! Plot surface model plus the two renderers the regression harness drives:
//! TikZ/pgfplots markup emission ([`tikz`]) and a native SVG → PDF reference
//! rendering ([`svg`], [`native`]).
//!
//! A [`Figure`] is an explicit value: test cases build and return one instead
//! of mutating a process-wide drawing context, which keeps cases composable
//! and safe to run concurrently.

pub mod model;
pub mod native;
pub mod svg;
pub mod tikz;

pub use model::{Axes, Figure, Series};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("figure {reason}")]
    EmptyFigure { reason: &'static str },
    #[error("failed to parse generated SVG for reference rendering")]
    SvgParse,
    #[error("failed to convert reference SVG to PDF")]
    PdfConvert,
    #[error("failed to write reference document {path}: {source}")]
    WriteReference {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Compact float formatting shared by the TikZ and SVG emitters: integral
/// values lose the fraction, everything else is trimmed to at most six
/// decimals.
pub(crate) fn fmt(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{v:.6}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
