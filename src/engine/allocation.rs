//! Free allocation of emissions allowances.
use anyhow::{Result, ensure};

/// Calculate a facility's free allowance for a period.
///
/// The allowance scales the facility's baseline intensity by the ratio of the target intensity to
/// the benchmark intensity, applied to the facility's realised output:
///
/// `allowance = baseline × output × (target / benchmark)`
///
/// # Returns
///
/// The allowance, or an error if `benchmark_intensity` is zero.
pub fn compute_allocation(
    baseline_intensity: f64,
    target_intensity: f64,
    benchmark_intensity: f64,
    output: f64,
) -> Result<f64> {
    ensure!(
        benchmark_intensity != 0.0,
        "Benchmark emissions intensity is zero, so free allocation cannot be calculated"
    );

    Ok(baseline_intensity * output * (target_intensity / benchmark_intensity))
}
