//! Native SVG rendering of a figure.
//!
//! This is the harness's independent baseline: a deliberately simple
//! renderer that shares no code with the TikZ → PDF path under test. The
//! output only needs to be faithful enough for a human comparing artifacts
//! after a fingerprint mismatch.

use crate::model::{Axes, Bounds, Figure, Series};
use crate::fmt;
use std::fmt::Write as _;

const PANEL_WIDTH: f64 = 420.0;
const PANEL_HEIGHT: f64 = 340.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 32.0;
const MARGIN_BOTTOM: f64 = 44.0;
const TITLE_BAND: f64 = 28.0;
const TICK_COUNT: usize = 5;

const PALETTE: [&str; 6] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];

/// Render a figure as a standalone SVG document.
pub fn render(figure: &Figure) -> String {
    let panels = figure.axes.len().max(1);
    let title_band = if figure.title.is_some() {
        TITLE_BAND
    } else {
        0.0
    };
    let width = PANEL_WIDTH * panels as f64;
    let height = PANEL_HEIGHT + title_band;

    let mut out = String::new();
    let _ = writeln!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        fmt(width),
        fmt(height),
        fmt(width),
        fmt(height)
    );
    let _ = writeln!(
        &mut out,
        r#"<rect x="0" y="0" width="{}" height="{}" fill="white"/>"#,
        fmt(width),
        fmt(height)
    );

    if let Some(title) = &figure.title {
        let _ = writeln!(
            &mut out,
            r##"<text x="{}" y="19" text-anchor="middle" font-family="Arial" font-size="16" fill="#111">{}</text>"##,
            fmt(width / 2.0),
            escape_xml(title)
        );
    }

    for (index, axes) in figure.axes.iter().enumerate() {
        render_panel(&mut out, axes, index as f64 * PANEL_WIDTH, title_band);
    }

    out.push_str("</svg>\n");
    out
}

/// Maps data coordinates into one panel's plot rectangle.
struct PanelFrame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    bounds: Bounds,
}

impl PanelFrame {
    fn x(&self, x: f64) -> f64 {
        let span = self.bounds.width();
        let t = if span == 0.0 {
            0.5
        } else {
            (x - self.bounds.min_x) / span
        };
        self.left + t * self.width
    }

    fn y(&self, y: f64) -> f64 {
        let span = self.bounds.height();
        let t = if span == 0.0 {
            0.5
        } else {
            (y - self.bounds.min_y) / span
        };
        self.top + (1.0 - t) * self.height
    }
}

fn render_panel(out: &mut String, axes: &Axes, offset_x: f64, offset_y: f64) {
    let bounds = padded_bounds(axes);
    let frame = PanelFrame {
        left: offset_x + MARGIN_LEFT,
        top: offset_y + MARGIN_TOP,
        width: PANEL_WIDTH - MARGIN_LEFT - MARGIN_RIGHT,
        height: PANEL_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM,
        bounds,
    };

    let _ = writeln!(
        out,
        r##"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="#444" stroke-width="1"/>"##,
        fmt(frame.left),
        fmt(frame.top),
        fmt(frame.width),
        fmt(frame.height)
    );

    render_ticks(out, &frame);

    if let Some(title) = &axes.title {
        let _ = writeln!(
            out,
            r##"<text x="{}" y="{}" text-anchor="middle" font-family="Arial" font-size="13" fill="#111">{}</text>"##,
            fmt(frame.left + frame.width / 2.0),
            fmt(frame.top - 10.0),
            escape_xml(title)
        );
    }
    if let Some(xlabel) = &axes.xlabel {
        let _ = writeln!(
            out,
            r##"<text x="{}" y="{}" text-anchor="middle" font-family="Arial" font-size="12" fill="#333">{}</text>"##,
            fmt(frame.left + frame.width / 2.0),
            fmt(frame.top + frame.height + 36.0),
            escape_xml(xlabel)
        );
    }
    if let Some(ylabel) = &axes.ylabel {
        let cx = frame.left - 44.0;
        let cy = frame.top + frame.height / 2.0;
        let _ = writeln!(
            out,
            r##"<text x="{}" y="{}" text-anchor="middle" font-family="Arial" font-size="12" fill="#333" transform="rotate(-90 {} {})">{}</text>"##,
            fmt(cx),
            fmt(cy),
            fmt(cx),
            fmt(cy),
            escape_xml(ylabel)
        );
    }

    for (index, series) in axes.series.iter().enumerate() {
        let color = PALETTE[index % PALETTE.len()];
        render_series(out, &frame, series, color);
    }
}

fn render_ticks(out: &mut String, frame: &PanelFrame) {
    for i in 0..TICK_COUNT {
        let t = i as f64 / (TICK_COUNT - 1) as f64;

        let x = frame.left + t * frame.width;
        let xv = frame.bounds.min_x + t * frame.bounds.width();
        let _ = writeln!(
            out,
            r##"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#444" stroke-width="1"/>"##,
            fmt(x),
            fmt(frame.top + frame.height),
            fmt(x),
            fmt(frame.top + frame.height + 4.0)
        );
        let _ = writeln!(
            out,
            r##"<text x="{}" y="{}" text-anchor="middle" font-family="Arial" font-size="10" fill="#333">{}</text>"##,
            fmt(x),
            fmt(frame.top + frame.height + 16.0),
            fmt_tick(xv)
        );

        let y = frame.top + frame.height - t * frame.height;
        let yv = frame.bounds.min_y + t * frame.bounds.height();
        let _ = writeln!(
            out,
            r##"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#444" stroke-width="1"/>"##,
            fmt(frame.left - 4.0),
            fmt(y),
            fmt(frame.left),
            fmt(y)
        );
        let _ = writeln!(
            out,
            r##"<text x="{}" y="{}" text-anchor="end" font-family="Arial" font-size="10" fill="#333">{}</text>"##,
            fmt(frame.left - 7.0),
            fmt(y + 3.0),
            fmt_tick(yv)
        );
    }
}

fn render_series(out: &mut String, frame: &PanelFrame, series: &Series, color: &str) {
    match series {
        Series::Line { points, .. } => {
            if points.len() < 2 {
                for &(x, y) in points {
                    let _ = writeln!(
                        out,
                        r#"<circle cx="{}" cy="{}" r="2.5" fill="{color}"/>"#,
                        fmt(frame.x(x)),
                        fmt(frame.y(y))
                    );
                }
                return;
            }
            let mut path = String::new();
            for (i, &(x, y)) in points.iter().enumerate() {
                let sep = if i == 0 { "" } else { " " };
                let _ = write!(&mut path, "{sep}{},{}", fmt(frame.x(x)), fmt(frame.y(y)));
            }
            let _ = writeln!(
                out,
                r#"<polyline points="{path}" fill="none" stroke="{color}" stroke-width="1.5"/>"#
            );
        }
        Series::Scatter { points, .. } => {
            for &(x, y) in points {
                let _ = writeln!(
                    out,
                    r#"<circle cx="{}" cy="{}" r="3" fill="{color}"/>"#,
                    fmt(frame.x(x)),
                    fmt(frame.y(y))
                );
            }
        }
        Series::Bar { points, .. } => {
            let bar_width = bar_width(frame, points);
            let baseline = frame.y(0.0);
            for &(x, y) in points {
                let top = frame.y(y);
                let (rect_y, rect_h) = if top <= baseline {
                    (top, baseline - top)
                } else {
                    (baseline, top - baseline)
                };
                let _ = writeln!(
                    out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{color}" fill-opacity="0.85"/>"#,
                    fmt(frame.x(x) - bar_width / 2.0),
                    fmt(rect_y),
                    fmt(bar_width),
                    fmt(rect_h.max(0.5))
                );
            }
        }
    }
}

fn bar_width(frame: &PanelFrame, points: &[(f64, f64)]) -> f64 {
    let mut min_gap = f64::INFINITY;
    let mut xs: Vec<f64> = points.iter().map(|&(x, _)| frame.x(x)).collect();
    xs.sort_by(|a, b| a.total_cmp(b));
    for pair in xs.windows(2) {
        min_gap = min_gap.min(pair[1] - pair[0]);
    }
    if min_gap.is_finite() {
        (min_gap * 0.8).max(2.0)
    } else {
        frame.width * 0.1
    }
}

fn padded_bounds(axes: &Axes) -> Bounds {
    let mut bounds = axes.data_bounds().unwrap_or(Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 1.0,
        max_y: 1.0,
    });
    let pad_x = if bounds.width() == 0.0 {
        1.0
    } else {
        bounds.width() * 0.05
    };
    let pad_y = if bounds.height() == 0.0 {
        1.0
    } else {
        bounds.height() * 0.05
    };
    bounds.min_x -= pad_x;
    bounds.max_x += pad_x;
    bounds.min_y -= pad_y;
    bounds.max_y += pad_y;
    bounds
}

fn fmt_tick(v: f64) -> String {
    if v.abs() < 1e-9 {
        return "0".to_string();
    }
    let s = format!("{v:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Axes, Figure, Series};

    fn sample() -> Figure {
        let mut axes = Axes::new().with_xlabel("t").with_ylabel("v");
        axes.push_series(Series::line(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.5)]));
        axes.push_series(Series::scatter(vec![(0.5, 0.8)]));
        Figure::single(axes).with_title("sample")
    }

    #[test]
    fn renders_standalone_svg() {
        let svg = render(&sample());
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("<polyline points="));
        assert!(svg.contains("<circle "));
        assert!(svg.contains(">sample</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn multi_panel_figures_widen_the_canvas() {
        let mut figure = sample();
        let mut second = Axes::new();
        second.push_series(Series::bar(vec![(1.0, 2.0), (2.0, 1.0)]));
        figure.push_axes(second);

        let svg = render(&figure);
        assert!(svg.contains(r#"width="840""#));
        assert!(svg.contains("fill-opacity=\"0.85\""));
    }

    #[test]
    fn titles_are_xml_escaped() {
        let mut axes = Axes::new();
        axes.push_series(Series::line(vec![(0.0, 0.0), (1.0, 1.0)]));
        let svg = render(&Figure::single(axes).with_title("a < b & c"));
        assert!(svg.contains(">a &lt; b &amp; c</text>"));
    }
}
