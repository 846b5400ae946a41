use crate::core::export::DEFAULT_FILENAME;
use crate::core::ConfigProvider;
use crate::domain::model::{Locale, OutputFormat, RunOptions};
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
    #[serde(default)]
    pub transpose: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
    #[serde(default = "default_filename")]
    pub filename: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    #[serde(default)]
    pub locale: Locale,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            filename: default_filename(),
            formats: default_formats(),
            locale: Locale::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub verbose: bool,
}

fn default_output_path() -> String {
    "./output".to_string()
}

fn default_filename() -> String {
    DEFAULT_FILENAME.to_string()
}

fn default_formats() -> Vec<String> {
    vec!["xlsx".to_string()]
}

impl TomlConfig {
    /// Loads and parses a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ForecastError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ForecastError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ForecastError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("input.path", &self.input.path)?;
        validation::validate_file_extensions(
            "input.path",
            &[self.input.path.clone()],
            &["csv", "xlsx"],
        )?;

        if let Some(target) = &self.model.target {
            validation::validate_non_empty_string("model.target", target)?;
        }

        for (name, value) in &self.forecast.values {
            if !value.is_finite() {
                return Err(ForecastError::InvalidConfigValueError {
                    field: format!("forecast.values.{}", name),
                    value: value.to_string(),
                    reason: "Forecast inputs must be finite numbers".to_string(),
                });
            }
        }

        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_file_extensions(
            "output.filename",
            &[self.output.filename.clone()],
            &["xlsx"],
        )?;
        validation::validate_output_formats("output.formats", &self.output.formats)?;

        Ok(())
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            transpose: self.input.transpose,
            target: self.model.target.clone(),
            inputs: self.forecast.values.clone(),
        }
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_filename(&self) -> &str {
        &self.output.filename
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        self.output
            .formats
            .iter()
            .filter_map(|f| f.parse().ok())
            .collect()
    }

    fn locale(&self) -> Locale {
        self.output.locale
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
