//! Univariate least-squares fits of every predictor against the target column.

use crate::domain::model::{
    DegenerateReason, FitOutcome, LinearFit, NumericTable, RegressionRow, ResultsTable,
};
use crate::utils::error::{ForecastError, Result};
use std::collections::BTreeMap;

/// Residual sum of squares below which a fit to a constant target counts as exact.
pub const PERFECT_FIT_TOLERANCE: f64 = 1e-10;

/// Coefficients and fit quality of `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl Coefficients {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fits every non-target column against `target`, in table order.
///
/// Degenerate columns still produce a row, so the result always has one row
/// per predictor. Inputs missing from `inputs` are taken as `0.0`.
pub fn run_regressions(
    table: &NumericTable,
    target: &str,
    inputs: &BTreeMap<String, f64>,
) -> Result<ResultsTable> {
    let target_column = table
        .column(target)
        .ok_or_else(|| ForecastError::UnknownTarget {
            target: target.to_string(),
            available: table.column_names().collect::<Vec<_>>().join(", "),
        })?;

    for name in inputs.keys() {
        if name == target || table.column(name).is_none() {
            tracing::warn!("Ignoring forecast input for '{}': not a predictor column", name);
        }
    }

    let rows = table
        .columns()
        .iter()
        .filter(|column| column.name != target)
        .map(|column| {
            let input = inputs.get(&column.name).copied().unwrap_or(0.0);
            let outcome = fit_outcome(&column.values, &target_column.values, input);
            match &outcome {
                FitOutcome::Fitted(fit) => tracing::debug!(
                    "{}: slope={:.6}, intercept={:.6}, r2={:.6}, n={}",
                    column.name,
                    fit.slope,
                    fit.intercept,
                    fit.r_squared,
                    fit.observations
                ),
                FitOutcome::Degenerate(reason) => {
                    tracing::info!("{}: degenerate fit ({})", column.name, reason)
                }
            }
            RegressionRow {
                variable: column.name.clone(),
                outcome,
            }
        })
        .collect();

    Ok(ResultsTable {
        target: target.to_string(),
        rows,
    })
}

/// Pairs rows where both values are present, fits them, and forecasts `input`.
pub fn fit_outcome(x: &[Option<f64>], y: &[Option<f64>], input: f64) -> FitOutcome {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(xi, yi)| Some(((*xi)?, (*yi)?)))
        .unzip();

    match fit_pairs(&xs, &ys) {
        Ok(coefficients) => FitOutcome::Fitted(LinearFit {
            slope: coefficients.slope,
            intercept: coefficients.intercept,
            r_squared: coefficients.r_squared,
            forecast: coefficients.predict(input),
            observations: xs.len(),
        }),
        Err(reason) => FitOutcome::Degenerate(reason),
    }
}

/// Closed-form ordinary least squares on paired observations.
pub fn fit_pairs(xs: &[f64], ys: &[f64]) -> std::result::Result<Coefficients, DegenerateReason> {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n == 0 {
        return Err(DegenerateReason::NoPairedRows);
    }
    if n < 2 {
        return Err(DegenerateReason::InsufficientData { paired: n });
    }
    if xs.iter().all(|&x| x == xs[0]) {
        return Err(DegenerateReason::ConstantPredictor);
    }
    if ys.iter().all(|&y| y == ys[0]) {
        // The mean of a constant picks up rounding noise, so the exact fit is set directly.
        return Ok(Coefficients {
            slope: 0.0,
            intercept: ys[0],
            r_squared: 1.0,
        });
    }

    let x_mean = xs.iter().sum::<f64>() / n as f64;
    let y_mean = ys.iter().sum::<f64>() / n as f64;

    let (sxx, sxy) = xs
        .iter()
        .zip(ys)
        .fold((0.0, 0.0), |(sxx, sxy), (&x, &y)| {
            let dx = x - x_mean;
            (sxx + dx * dx, sxy + dx * (y - y_mean))
        });

    if !(sxx.is_finite() && sxy.is_finite() && sxx > 0.0) {
        return Err(DegenerateReason::NumericOverflow);
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let (ss_res, ss_tot) = xs
        .iter()
        .zip(ys)
        .fold((0.0, 0.0), |(ss_res, ss_tot), (&x, &y)| {
            let residual = y - (intercept + slope * x);
            let deviation = y - y_mean;
            (ss_res + residual * residual, ss_tot + deviation * deviation)
        });

    if !(slope.is_finite() && intercept.is_finite() && ss_res.is_finite() && ss_tot.is_finite()) {
        return Err(DegenerateReason::NumericOverflow);
    }

    Ok(Coefficients {
        slope,
        intercept,
        r_squared: r_squared(ss_res, ss_tot),
    })
}

/// `1 - SS_res / SS_tot`, with a constant target scoring 1 when fitted exactly and 0 otherwise.
pub fn r_squared(ss_res: f64, ss_tot: f64) -> f64 {
    if ss_tot > 0.0 {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    } else if ss_res < PERFECT_FIT_TOLERANCE {
        1.0
    } else {
        0.0
    }
}
