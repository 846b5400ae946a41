use crate::config::parse_value_pair;
use crate::core::export::DEFAULT_FILENAME;
use crate::core::ConfigProvider;
use crate::domain::model::{Locale, OutputFormat, RunOptions};
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "regression-forecast")]
#[command(about = "Simple regressions per variable with an R²-weighted forecast")]
pub struct CliConfig {
    /// CSV or XLSX file whose first row holds the column names
    #[arg(short, long)]
    pub input: String,

    /// Dependent variable (defaults to the first column)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Swap rows and columns before fitting
    #[arg(long)]
    pub transpose: bool,

    /// Forecast input for one predictor, e.g. --value Publicidad=1500
    #[arg(long = "value", value_name = "NAME=NUMBER", value_parser = parse_value_pair)]
    pub values: Vec<(String, f64)>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_FILENAME)]
    pub output_filename: String,

    #[arg(long, value_delimiter = ',', default_value = "xlsx")]
    pub formats: Vec<String>,

    #[arg(long, default_value = "es")]
    pub locale: String,

    /// Print results without writing any file
    #[arg(long)]
    pub no_export: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            transpose: self.transpose,
            target: self.target.clone(),
            inputs: self.values.iter().cloned().collect(),
        }
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_filename(&self) -> &str {
        &self.output_filename
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        self.formats.iter().filter_map(|f| f.parse().ok()).collect()
    }

    fn locale(&self) -> Locale {
        self.locale.parse().unwrap_or_default()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_file_extensions("input", &[self.input.clone()], &["csv", "xlsx"])?;

        if let Some(target) = &self.target {
            validation::validate_non_empty_string("target", target)?;
        }

        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_file_extensions(
            "output_filename",
            &[self.output_filename.clone()],
            &["xlsx"],
        )?;
        validation::validate_output_formats("formats", &self.formats)?;

        self.locale
            .parse::<Locale>()
            .map_err(|reason| ForecastError::InvalidConfigValueError {
                field: "locale".to_string(),
                value: self.locale.clone(),
                reason,
            })?;

        Ok(())
    }
}
