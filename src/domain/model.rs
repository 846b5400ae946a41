use crate::utils::error::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A table as read from disk: unique header names and rows of raw text cells.
///
/// Every row is exactly as wide as the header; [`TextTable::new`] is the only
/// constructor. A transposed table also carries the old header names as row
/// labels, which are never treated as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    row_labels: Option<RowLabels>,
}

/// Names for the rows of a table, plus the name of the label column itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLabels {
    pub name: String,
    pub values: Vec<String>,
}

impl TextTable {
    /// Builds a table, making header names unique and padding short rows with
    /// empty cells. Cells beyond the header width are dropped.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = unique_headers(headers);
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self {
            headers,
            rows,
            row_labels: None,
        }
    }

    /// Attaches one label per row, padding or truncating to the row count.
    pub fn with_row_labels(mut self, mut labels: RowLabels) -> Self {
        labels.values.resize(self.rows.len(), String::new());
        self.row_labels = Some(labels);
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_labels(&self) -> Option<&RowLabels> {
        self.row_labels.as_ref()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// Blank names become `Unnamed: {index}`; repeats get `.1`, `.2`, ... suffixes.
pub fn unique_headers<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut used: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::new();

    for (index, name) in names.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", index)
        } else {
            name
        };

        let mut counter = counters.get(&base).copied().unwrap_or(0);
        let mut candidate = base.clone();
        while used.contains(&candidate) {
            counter += 1;
            candidate = format!("{}.{}", base, counter);
        }

        counters.insert(base, counter);
        used.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Column-major table where every cell is a finite number or missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericTable {
    columns: Vec<NumericColumn>,
    row_count: usize,
}

impl NumericTable {
    pub fn new(columns: Vec<NumericColumn>, row_count: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.values.len() == row_count));
        Self { columns, row_count }
    }

    pub fn columns(&self) -> &[NumericColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&NumericColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Csv,
    Xlsx,
}

impl InputFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "csv" => Ok(InputFormat::Csv),
            "xlsx" => Ok(InputFormat::Xlsx),
            _ => Err(LoadError::UnsupportedFormat { extension }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Xlsx,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "Unsupported format '{}'. Valid formats: xlsx, csv, json",
                other
            )),
        }
    }
}

/// Language of the exported headers and rendered labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    pub fn result_headers(&self) -> [&'static str; 5] {
        match self {
            Locale::Es => ["Variable", "Pendiente (β)", "Intersección (α)", "R²", "Pronóstico"],
            Locale::En => ["Variable", "Slope (β)", "Intercept (α)", "R²", "Forecast"],
        }
    }

    pub fn sheet_name(&self) -> &'static str {
        match self {
            Locale::Es => "Resultados",
            Locale::En => "Results",
        }
    }

    pub fn weighted_label(&self) -> &'static str {
        match self {
            Locale::Es => "Pronóstico ponderado",
            Locale::En => "Weighted forecast",
        }
    }

    pub fn cannot_compute_notice(&self) -> &'static str {
        match self {
            Locale::Es => "R² total es cero. No se puede calcular pronóstico ponderado.",
            Locale::En => "Total R² is zero. Cannot compute weighted forecast.",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" => Ok(Locale::Es),
            "en" => Ok(Locale::En),
            other => Err(format!("Unsupported locale '{}'. Valid locales: es, en", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub forecast: f64,
    pub observations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DegenerateReason {
    NoPairedRows,
    InsufficientData { paired: usize },
    ConstantPredictor,
    /// Squared deviations left the finite `f64` range.
    NumericOverflow,
}

impl fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateReason::NoPairedRows => write!(f, "no rows with both values present"),
            DegenerateReason::InsufficientData { paired } => {
                write!(f, "only {} paired observation(s), need at least 2", paired)
            }
            DegenerateReason::ConstantPredictor => write!(f, "predictor has zero variance"),
            DegenerateReason::NumericOverflow => {
                write!(f, "values too large to fit without overflow")
            }
        }
    }
}

/// Result of one univariate fit. A degenerate fit is a value, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FitOutcome {
    Fitted(LinearFit),
    Degenerate(DegenerateReason),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionRow {
    pub variable: String,
    pub outcome: FitOutcome,
}

impl RegressionRow {
    pub fn fit(&self) -> Option<&LinearFit> {
        match &self.outcome {
            FitOutcome::Fitted(fit) => Some(fit),
            FitOutcome::Degenerate(_) => None,
        }
    }

    pub fn slope(&self) -> Option<f64> {
        self.fit().map(|f| f.slope)
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fit().map(|f| f.intercept)
    }

    pub fn r_squared(&self) -> Option<f64> {
        self.fit().map(|f| f.r_squared)
    }

    pub fn forecast(&self) -> Option<f64> {
        self.fit().map(|f| f.forecast)
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self.outcome, FitOutcome::Degenerate(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsTable {
    pub target: String,
    pub rows: Vec<RegressionRow>,
}

impl ResultsTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RegressionRow> {
        self.rows.iter()
    }

    pub fn row(&self, variable: &str) -> Option<&RegressionRow> {
        self.rows.iter().find(|r| r.variable == variable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum WeightedForecast {
    Value(f64),
    Undefined,
}

impl WeightedForecast {
    pub fn value(&self) -> Option<f64> {
        match self {
            WeightedForecast::Value(v) => Some(*v),
            WeightedForecast::Undefined => None,
        }
    }

    /// Two-decimal rendering used wherever the forecast is displayed.
    pub fn display_value(&self) -> Option<String> {
        self.value().map(|v| format!("{:.2}", v))
    }
}

/// Everything one evaluation needs besides the table itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    pub transpose: bool,
    /// Defaults to the first column when unset.
    pub target: Option<String>,
    pub inputs: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub table: NumericTable,
    pub results: ResultsTable,
    pub weighted: WeightedForecast,
}
