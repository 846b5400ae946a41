use crate::core::report::{render_results, render_weighted};
use crate::core::Pipeline;
use crate::domain::model::{Evaluation, Locale};
use crate::utils::error::Result;

#[derive(Debug)]
pub struct RunSummary {
    pub evaluation: Evaluation,
    pub outputs: Vec<String>,
}

pub struct ForecastEngine<P: Pipeline> {
    pipeline: P,
    locale: Locale,
    export_enabled: bool,
}

impl<P: Pipeline> ForecastEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            locale: Locale::default(),
            export_enabled: true,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_export(mut self, enabled: bool) -> Self {
        self.export_enabled = enabled;
        self
    }

    /// Runs load, fit, and export once. Results are printed before the export
    /// step so an export failure never hides them.
    pub fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting regression run");

        tracing::info!("Loading data...");
        let table = self.pipeline.extract()?;
        tracing::info!(
            "Loaded {} columns and {} rows",
            table.width(),
            table.height()
        );

        tracing::info!("Fitting regressions...");
        let evaluation = self.pipeline.transform(table)?;
        let degenerate = evaluation.results.iter().filter(|r| r.is_degenerate()).count();
        tracing::info!(
            "Fitted {} regressions against '{}' ({} degenerate)",
            evaluation.results.len(),
            evaluation.results.target,
            degenerate
        );

        println!("{}", render_results(&evaluation.results, self.locale));
        println!("{}", render_weighted(&evaluation.weighted, self.locale));

        let outputs = if self.export_enabled {
            tracing::info!("Exporting results...");
            let outputs = self.pipeline.load(&evaluation)?;
            for path in &outputs {
                tracing::info!("Output saved to: {}", path);
            }
            outputs
        } else {
            tracing::debug!("Export disabled");
            Vec::new()
        };

        Ok(RunSummary {
            evaluation,
            outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RunOptions, TextTable};
    use crate::utils::error::{ExportError, ForecastError};
    use std::cell::Cell;

    struct StubPipeline {
        fail_load: bool,
        load_calls: Cell<usize>,
    }

    impl Pipeline for StubPipeline {
        fn extract(&self) -> Result<TextTable> {
            Ok(TextTable::new(
                vec!["Y".to_string(), "X".to_string()],
                vec![
                    vec!["2".to_string(), "1".to_string()],
                    vec!["4".to_string(), "2".to_string()],
                ],
            ))
        }

        fn transform(&self, table: TextTable) -> Result<Evaluation> {
            crate::core::pipeline::evaluate(&table, &RunOptions::default())
        }

        fn load(&self, _evaluation: &Evaluation) -> Result<Vec<String>> {
            self.load_calls.set(self.load_calls.get() + 1);
            if self.fail_load {
                let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
                return Err(ExportError::Io(io).into());
            }
            Ok(vec!["out/resultados_regresion.xlsx".to_string()])
        }
    }

    #[test]
    fn test_run_returns_outputs() {
        let engine = ForecastEngine::new(StubPipeline {
            fail_load: false,
            load_calls: Cell::new(0),
        });
        let summary = engine.run().unwrap();
        assert_eq!(summary.outputs, vec!["out/resultados_regresion.xlsx".to_string()]);
        assert_eq!(summary.evaluation.results.len(), 1);
    }

    #[test]
    fn test_run_without_export_skips_load() {
        let engine = ForecastEngine::new(StubPipeline {
            fail_load: true,
            load_calls: Cell::new(0),
        })
        .with_export(false);

        let summary = engine.run().unwrap();
        assert!(summary.outputs.is_empty());
        assert_eq!(engine.pipeline.load_calls.get(), 0);
    }

    #[test]
    fn test_run_surfaces_export_errors() {
        let engine = ForecastEngine::new(StubPipeline {
            fail_load: true,
            load_calls: Cell::new(0),
        })
        .with_locale(Locale::En);
        assert!(matches!(engine.run(), Err(ForecastError::Export(_))));
    }
}
