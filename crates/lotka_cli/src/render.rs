//! Plain-text rendering of a [`Comparison`].

use lotka_core::equilibrium::{classify, equilibria};
use lotka_core::{Comparison, Trajectory};
use std::io::{self, Write};

pub fn write_table(
    out: &mut impl Write,
    comparison: &Comparison,
    adaptive_label: &str,
    samples: usize,
) -> io::Result<()> {
    let scenario = &comparison.scenario;
    writeln!(out, "Prey-predator model")?;
    writeln!(out, "{}", scenario.title())?;
    writeln!(out)?;

    writeln!(out, "Equilibria")?;
    for point in equilibria(&scenario.parameters) {
        let result = classify(&scenario.parameters, point);
        writeln!(
            out,
            "  N1 = {:<10.6} N2 = {:<10.6} {:?}",
            point.prey, point.predator, result.stability
        )?;
    }
    writeln!(out)?;

    write_series(out, "Euler", &comparison.fixed, samples)?;
    write_series(out, adaptive_label, &comparison.adaptive, samples)?;

    let (fixed, adaptive) = comparison.invariant_drift();
    writeln!(out, "Max drift of the conserved quantity")?;
    writeln!(out, "  Euler: {}", format_drift(fixed))?;
    writeln!(out, "  {adaptive_label}: {}", format_drift(adaptive))?;
    Ok(())
}

fn write_series(
    out: &mut impl Write,
    label: &str,
    trajectory: &Trajectory,
    samples: usize,
) -> io::Result<()> {
    writeln!(out, "{label} ({} points)", trajectory.len())?;
    writeln!(out, "  {:>12} {:>14} {:>14}", "time", "N1 (prey)", "N2 (predator)")?;
    for index in sample_indices(trajectory.len(), samples) {
        let t = trajectory.times()[index];
        let prey = trajectory.prey()[index];
        let predator = trajectory.predator()[index];
        writeln!(out, "  {t:>12.4} {prey:>14.6} {predator:>14.6}")?;
    }

    // Phase-plane extent of the orbit.
    let range = |values: &[f64]| {
        values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    };
    let (prey_lo, prey_hi) = range(trajectory.prey());
    let (pred_lo, pred_hi) = range(trajectory.predator());
    writeln!(
        out,
        "  phase plane: N1 in [{prey_lo:.6}, {prey_hi:.6}], N2 in [{pred_lo:.6}, {pred_hi:.6}]"
    )?;
    writeln!(out)
}

/// Evenly spaced indices into `0..len`, always including both ends.
fn sample_indices(len: usize, samples: usize) -> Vec<usize> {
    if len == 0 || samples == 0 {
        return Vec::new();
    }
    if samples >= len {
        return (0..len).collect();
    }
    if samples == 1 {
        return vec![0];
    }
    let last = len - 1;
    let mut indices: Vec<usize> = (0..samples)
        .map(|k| (k * last + (samples - 1) / 2) / (samples - 1))
        .collect();
    indices.dedup();
    indices
}

fn format_drift(drift: Option<f64>) -> String {
    match drift {
        Some(value) => format!("{value:.3e}"),
        None => "undefined (orbit left the positive quadrant)".to_string(),
    }
}
