//! TikZ/pgfplots markup emission.
//!
//! The emitted text is a bare `tikzpicture` meant to be `\input` into a
//! wrapper document; it never emits a preamble of its own.

use crate::model::{Axes, Figure, Series};
use crate::{Error, Result, fmt};
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct TikzOptions {
    /// Physical width handed to pgfplots, e.g. `7.5cm`.
    pub figure_width: String,
    /// When true, prefix the output with `%` comments describing the figure.
    pub annotate: bool,
}

impl Default for TikzOptions {
    fn default() -> Self {
        Self {
            figure_width: "7.5cm".to_string(),
            annotate: false,
        }
    }
}

/// Render a figure as pgfplots markup.
///
/// Multi-panel figures use the `groupplots` library; single-panel figures a
/// plain `axis` environment.
pub fn render(figure: &Figure, options: &TikzOptions) -> Result<String> {
    if figure.axes.is_empty() {
        return Err(Error::EmptyFigure {
            reason: "has no axes",
        });
    }

    let mut out = String::new();
    if options.annotate {
        let _ = writeln!(
            &mut out,
            "% figure with {} axes panel(s), width {}",
            figure.axes.len(),
            options.figure_width
        );
        if let Some(title) = &figure.title {
            let _ = writeln!(&mut out, "% title: {title}");
        }
    }

    out.push_str("\\begin{tikzpicture}\n");
    if figure.axes.len() == 1 {
        emit_axes(&mut out, &figure.axes[0], "axis", options)?;
    } else {
        let _ = writeln!(
            &mut out,
            "\\begin{{groupplot}}[group style={{group size={} by 1}}]",
            figure.axes.len()
        );
        for axes in &figure.axes {
            out.push_str("\\nextgroupplot");
            emit_axis_options(&mut out, axes, options);
            emit_plots(&mut out, axes, options)?;
        }
        out.push_str("\\end{groupplot}\n");
    }
    out.push_str("\\end{tikzpicture}\n");
    Ok(out)
}

fn emit_axes(out: &mut String, axes: &Axes, env: &str, options: &TikzOptions) -> Result<()> {
    let _ = write!(out, "\\begin{{{env}}}");
    emit_axis_options(out, axes, options);
    emit_plots(out, axes, options)?;
    let _ = writeln!(out, "\\end{{{env}}}");
    Ok(())
}

fn emit_axis_options(out: &mut String, axes: &Axes, options: &TikzOptions) {
    out.push_str("[\n");
    let _ = writeln!(out, "width={},", options.figure_width);
    if let Some(title) = &axes.title {
        let _ = writeln!(out, "title={{{}}},", escape_tex(title));
    }
    if let Some(xlabel) = &axes.xlabel {
        let _ = writeln!(out, "xlabel={{{}}},", escape_tex(xlabel));
    }
    if let Some(ylabel) = &axes.ylabel {
        let _ = writeln!(out, "ylabel={{{}}},", escape_tex(ylabel));
    }
    out.push_str("]\n");
}

fn emit_plots(out: &mut String, axes: &Axes, options: &TikzOptions) -> Result<()> {
    if axes.series.is_empty() {
        return Err(Error::EmptyFigure {
            reason: "axes panel has no series",
        });
    }
    for series in &axes.series {
        if series.points().is_empty() {
            return Err(Error::EmptyFigure {
                reason: "series has no points",
            });
        }
        if options.annotate {
            if let Some(label) = series.label() {
                let _ = writeln!(out, "% series: {label}");
            }
        }
        match series {
            Series::Line { .. } => out.push_str("\\addplot coordinates {\n"),
            Series::Scatter { .. } => out.push_str("\\addplot[only marks] coordinates {\n"),
            Series::Bar { .. } => out.push_str("\\addplot[ybar] coordinates {\n"),
        }
        for &(x, y) in series.points() {
            let _ = writeln!(out, "({},{})", fmt(x), fmt(y));
        }
        out.push_str("};\n");
        if let Some(label) = series.label() {
            let _ = writeln!(out, "\\addlegendentry{{{}}}", escape_tex(label));
        }
    }
    Ok(())
}

/// Escape the TeX special characters that can appear in user-facing labels.
fn escape_tex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}
