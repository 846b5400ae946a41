use crate::core::aggregate::weighted_forecast;
use crate::core::export::export;
use crate::core::loader::load_table;
use crate::core::normalize::normalize;
use crate::core::regression::run_regressions;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{Evaluation, InputFormat, NumericTable, RunOptions, TextTable};
use crate::utils::error::{ForecastError, Result};
use std::path::Path;

/// One full evaluation: normalize, fit every predictor, aggregate.
///
/// Pure: the same table and options always give the same result.
pub fn evaluate(table: &TextTable, options: &RunOptions) -> Result<Evaluation> {
    let numeric = normalize(table, options.transpose);
    let target = resolve_target(&numeric, options.target.as_deref())?;

    let results = run_regressions(&numeric, &target, &options.inputs)?;
    let weighted = weighted_forecast(&results);

    Ok(Evaluation {
        table: numeric,
        results,
        weighted,
    })
}

fn resolve_target(table: &NumericTable, requested: Option<&str>) -> Result<String> {
    match requested {
        Some(target) => Ok(target.to_string()),
        None => {
            let first = table
                .column_names()
                .next()
                .ok_or_else(|| ForecastError::ValidationError {
                    message: "the table has no columns".to_string(),
                })?;
            tracing::info!("No dependent variable selected, using first column '{}'", first);
            Ok(first.to_string())
        }
    }
}

/// Reads the configured input through `storage` and writes every configured
/// output format next to each other under the output path.
pub struct ForecastPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ForecastPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn output_file(&self, extension: &str) -> String {
        let filename = Path::new(self.config.output_filename()).with_extension(extension);
        Path::new(self.config.output_path())
            .join(filename)
            .to_string_lossy()
            .into_owned()
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for ForecastPipeline<S, C> {
    fn extract(&self) -> Result<TextTable> {
        let path = self.config.input_path();
        let format = InputFormat::from_path(path)?;

        tracing::debug!("Reading {:?} input from {}", format, path);
        let bytes = self.storage.read_file(path)?;
        Ok(load_table(&bytes, format)?)
    }

    fn transform(&self, table: TextTable) -> Result<Evaluation> {
        evaluate(&table, &self.config.run_options())
    }

    fn load(&self, evaluation: &Evaluation) -> Result<Vec<String>> {
        let locale = self.config.locale();
        let mut written = Vec::new();

        for format in self.config.output_formats() {
            let bytes = export(format, evaluation, locale)?;
            let path = self.output_file(format.extension());

            tracing::debug!("Writing {} ({} bytes)", path, bytes.len());
            self.storage.write_file(&path, &bytes)?;
            written.push(path);
        }

        Ok(written)
    }
}
