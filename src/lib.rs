pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use crate::core::{
    etl::{ForecastEngine, RunSummary},
    pipeline::{evaluate, ForecastPipeline},
    storage::LocalStorage,
};
pub use domain::model::{
    Evaluation, FitOutcome, Locale, NumericTable, OutputFormat, RegressionRow, ResultsTable,
    RowLabels, RunOptions, TextTable, WeightedForecast,
};
pub use utils::error::{ExportError, ForecastError, LoadError, Result};
