//! Native reference rendering: figure → SVG → PDF bytes.
//!
//! The reference document is produced by a rendering path completely separate
//! from the TikZ toolchain under test. It is kept for human comparison only;
//! the automated oracle is the precomputed fingerprint.

use crate::model::Figure;
use crate::{Error, Result};
use std::path::Path;

/// Render the figure's native baseline as PDF bytes.
pub fn reference_pdf(figure: &Figure) -> Result<Vec<u8>> {
    let svg = crate::svg::render(figure);

    let mut opt = svg2pdf::usvg::Options::default();
    // Keep output stable-ish across environments while still using system fonts.
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();

    let tree = svg2pdf::usvg::Tree::from_str(&svg, &opt).map_err(|_| Error::SvgParse)?;

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| Error::PdfConvert)
}

/// Render the native baseline and write it to `path`.
pub fn save_reference(figure: &Figure, path: &Path) -> Result<()> {
    let bytes = reference_pdf(figure)?;
    std::fs::write(path, bytes).map_err(|source| Error::WriteReference {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Axes, Figure, Series};

    #[test]
    fn reference_pdf_has_pdf_magic() {
        let mut axes = Axes::new();
        axes.push_series(Series::line(vec![(0.0, 0.0), (1.0, 1.0)]));
        let bytes = reference_pdf(&Figure::single(axes)).expect("pdf");
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
