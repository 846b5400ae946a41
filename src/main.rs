use clap::Parser;
use regression_forecast::core::ConfigProvider;
use regression_forecast::utils::error::{ErrorSeverity, ForecastError};
use regression_forecast::utils::{logger, validation::Validate};
use regression_forecast::{CliConfig, ForecastEngine, ForecastPipeline, LocalStorage};

fn main() {
    let config = CliConfig::parse();

    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting regression-forecast CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let locale = config.locale();
    let export_enabled = !config.no_export;

    let storage = LocalStorage::new(".");
    let pipeline = ForecastPipeline::new(storage, config);
    let engine = ForecastEngine::new(pipeline)
        .with_locale(locale)
        .with_export(export_enabled);

    match engine.run() {
        Ok(summary) => {
            for path in &summary.outputs {
                println!("📁 Output saved to: {}", path);
            }
        }
        Err(e) => std::process::exit(report_failure(&e)),
    }
}

fn report_failure(e: &ForecastError) -> i32 {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
