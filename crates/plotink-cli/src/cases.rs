//! Built-in test cases.
//!
//! Each case pairs a render function with the fingerprint accepted for the
//! current toolchain baseline. Fingerprints are literals by design: on a
//! legitimate rendering change, a human re-runs the case, inspects the
//! artifacts, and pastes the new value here.

use plotink::{CaseRegistry, FnCase};
use plotink_figure::{Axes, Figure, Series};

pub fn builtin_registry() -> CaseRegistry {
    let mut registry = CaseRegistry::new();
    registry.register(FnCase::new("simple_line", "af3c91e0b4d2f718", simple_line));
    registry.register(FnCase::new("bar_chart", "9c6a5a3c66c3c399", bar_chart));
    registry.register(FnCase::new(
        "scatter_points",
        "b2d04f1e8d2c7a53",
        scatter_points,
    ));
    registry.register(FnCase::new(
        "grouped_axes",
        "e1783c1e87c3b166",
        grouped_axes,
    ));
    registry
}

fn simple_line() -> Figure {
    let points: Vec<(f64, f64)> = (0..=60)
        .map(|i| {
            let x = i as f64 / 10.0;
            (x, x.sin())
        })
        .collect();
    let mut axes = Axes::new().with_xlabel("x").with_ylabel("sin(x)");
    axes.push_series(Series::line(points).with_label("sine"));
    Figure::single(axes).with_title("simple line")
}

fn bar_chart() -> Figure {
    let mut axes = Axes::new().with_xlabel("bucket").with_ylabel("count");
    axes.push_series(
        Series::bar(vec![
            (1.0, 4.0),
            (2.0, 7.0),
            (3.0, 2.0),
            (4.0, 5.5),
            (5.0, 3.0),
        ])
        .with_label("samples"),
    );
    Figure::single(axes).with_title("bar chart")
}

fn scatter_points() -> Figure {
    // Deterministic pseudo-random cloud; a fixed LCG keeps the case stable
    // without pulling in an RNG.
    let mut state: u64 = 0x5eed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };
    let points: Vec<(f64, f64)> = (0..40).map(|_| (next(), next())).collect();

    let mut axes = Axes::new().with_xlabel("u").with_ylabel("v");
    axes.push_series(Series::scatter(points).with_label("cloud"));
    Figure::single(axes).with_title("scatter points")
}

fn grouped_axes() -> Figure {
    let mut left = Axes::new().with_title("growth").with_xlabel("t");
    left.push_series(Series::line(
        (0..=20)
            .map(|i| {
                let x = i as f64 / 4.0;
                (x, x.exp().min(50.0))
            })
            .collect(),
    ));

    let mut right = Axes::new().with_title("decay").with_xlabel("t");
    right.push_series(Series::line(
        (0..=20)
            .map(|i| {
                let x = i as f64 / 4.0;
                (x, (-x).exp())
            })
            .collect(),
    ));

    let mut figure = Figure::new().with_title("grouped axes");
    figure.push_axes(left);
    figure.push_axes(right);
    figure
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_cases_render_nonempty_figures() {
        let registry = builtin_registry();
        assert_eq!(registry.len(), 4);
        for (name, case) in registry.iter() {
            let figure = case.render();
            assert!(!figure.axes.is_empty(), "case {name} rendered no axes");
            for axes in &figure.axes {
                assert!(!axes.series.is_empty(), "case {name} has an empty panel");
            }
        }
    }

    #[test]
    fn builtin_fingerprints_are_well_formed() {
        let registry = builtin_registry();
        for (name, case) in registry.iter() {
            let parsed = case
                .expected_fingerprint()
                .parse::<plotink::Fingerprint>()
                .unwrap_or_else(|_| panic!("case {name} carries a malformed fingerprint"));
            assert_eq!(parsed.to_string(), case.expected_fingerprint());
        }
    }

    #[test]
    fn render_functions_are_deterministic() {
        let a = scatter_points();
        let b = scatter_points();
        assert_eq!(a.axes[0].series[0].points(), b.axes[0].series[0].points());
    }
}
