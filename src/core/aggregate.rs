use crate::domain::model::{ResultsTable, WeightedForecast};

/// R²-weighted mean of the per-variable forecasts.
///
/// Degenerate rows contribute to neither sum. A zero total weight yields
/// [`WeightedForecast::Undefined`], never a number.
pub fn weighted_forecast(results: &ResultsTable) -> WeightedForecast {
    let (weighted_sum, total_weight) = results
        .iter()
        .filter_map(|row| row.fit())
        .fold((0.0, 0.0), |(sum, weight), fit| {
            (sum + fit.forecast * fit.r_squared, weight + fit.r_squared)
        });

    if total_weight > 0.0 {
        WeightedForecast::Value(weighted_sum / total_weight)
    } else {
        tracing::warn!("Total R² is zero, weighted forecast is undefined");
        WeightedForecast::Undefined
    }
}
