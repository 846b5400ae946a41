use anyhow::Context;
use clap::Parser;
use regression_forecast::config::toml_config::TomlConfig;
use regression_forecast::core::{ConfigProvider, Pipeline};
use regression_forecast::utils::error::ErrorSeverity;
use regression_forecast::utils::{logger, validation::Validate};
use regression_forecast::{ForecastEngine, ForecastPipeline, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-forecast")]
#[command(about = "Regression forecast driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "forecast.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the dependent variable from config
    #[arg(long)]
    target: Option<String>,

    /// Override the transpose setting from config
    #[arg(long)]
    transpose: Option<bool>,

    /// Dry run - load the data and show the plan without fitting
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    let logging = config.logging();
    logger::init_logger(args.verbose || logging.verbose, logging.json);

    tracing::info!("🚀 Starting TOML-based regression forecast");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    if let Some(target) = args.target {
        tracing::info!("🔧 Target overridden to: {}", target);
        config.model.target = Some(target);
    }
    if let Some(transpose) = args.transpose {
        tracing::info!("🔧 Transpose overridden to: {}", transpose);
        config.input.transpose = transpose;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    let locale = config.locale();
    let pipeline = ForecastPipeline::new(LocalStorage::new("."), config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no regressions will be fitted");
        let table = pipeline.extract().context("dry run could not load the input")?;
        println!("Columns ({} rows):", table.height());
        for header in table.headers() {
            println!("  - {}", header);
        }
        return Ok(());
    }

    let engine = ForecastEngine::new(pipeline).with_locale(locale);
    match engine.run() {
        Ok(summary) => {
            for path in &summary.outputs {
                println!("📁 Output saved to: {}", path);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

fn display_config_summary(config: &TomlConfig) {
    let options = config.run_options();
    tracing::info!("📋 Input: {} (transpose: {})", config.input_path(), options.transpose);
    tracing::info!(
        "📋 Target: {}",
        options.target.as_deref().unwrap_or("<first column>")
    );
    for (name, value) in &options.inputs {
        tracing::info!("📋 Forecast input {} = {}", name, value);
    }
    tracing::info!(
        "📋 Output: {}/{} as {:?} ({:?})",
        config.output_path(),
        config.output_filename(),
        config.output_formats(),
        config.locale()
    );
}
