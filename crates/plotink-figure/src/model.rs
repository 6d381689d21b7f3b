//! The drawing surface: figures, axes, and data series.

use serde::{Deserialize, Serialize};

/// A complete figure: one or more axes panels plus an optional title.
///
/// Multiple axes render as a pgfplots `groupplot` on the TikZ side and as
/// side-by-side panels on the native SVG side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub axes: Vec<Axes>,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    /// A figure with a single axes panel.
    pub fn single(axes: Axes) -> Self {
        Self {
            title: None,
            axes: vec![axes],
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn push_axes(&mut self, axes: Axes) -> &mut Self {
        self.axes.push(axes);
        self
    }
}

/// One axes panel with its labels and data series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Axes {
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub series: Vec<Series>,
}

impl Axes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_xlabel(mut self, label: impl Into<String>) -> Self {
        self.xlabel = Some(label.into());
        self
    }

    pub fn with_ylabel(mut self, label: impl Into<String>) -> Self {
        self.ylabel = Some(label.into());
        self
    }

    pub fn push_series(&mut self, series: Series) -> &mut Self {
        self.series.push(series);
        self
    }

    /// Data bounds over all series, `None` when the panel holds no points.
    pub fn data_bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for series in &self.series {
            for &(x, y) in series.points() {
                let b = bounds.get_or_insert(Bounds {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                });
                b.min_x = b.min_x.min(x);
                b.min_y = b.min_y.min(y);
                b.max_x = b.max_x.max(x);
                b.max_y = b.max_y.max(y);
            }
            // Bars grow from the value baseline, so zero is always visible.
            if matches!(series, Series::Bar { .. }) {
                if let Some(b) = bounds.as_mut() {
                    b.min_y = b.min_y.min(0.0);
                    b.max_y = b.max_y.max(0.0);
                }
            }
        }
        bounds
    }
}

/// A single data series inside an axes panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Series {
    /// Connected polyline through the points, in order.
    Line {
        label: Option<String>,
        points: Vec<(f64, f64)>,
    },
    /// Unconnected markers.
    Scatter {
        label: Option<String>,
        points: Vec<(f64, f64)>,
    },
    /// Vertical bars anchored at y = 0.
    Bar {
        label: Option<String>,
        points: Vec<(f64, f64)>,
    },
}

impl Series {
    pub fn line(points: Vec<(f64, f64)>) -> Self {
        Self::Line {
            label: None,
            points,
        }
    }

    pub fn scatter(points: Vec<(f64, f64)>) -> Self {
        Self::Scatter {
            label: None,
            points,
        }
    }

    pub fn bar(points: Vec<(f64, f64)>) -> Self {
        Self::Bar {
            label: None,
            points,
        }
    }

    pub fn with_label(self, label: impl Into<String>) -> Self {
        let label = Some(label.into());
        match self {
            Self::Line { points, .. } => Self::Line { label, points },
            Self::Scatter { points, .. } => Self::Scatter { label, points },
            Self::Bar { points, .. } => Self::Bar { label, points },
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Line { label, .. } | Self::Scatter { label, .. } | Self::Bar { label, .. } => {
                label.as_deref()
            }
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        match self {
            Self::Line { points, .. } | Self::Scatter { points, .. } | Self::Bar { points, .. } => {
                points
            }
        }
    }
}

/// Axis-aligned data bounds of a panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}
