use approx::assert_relative_eq;
use regression_forecast::core::ConfigProvider;
use regression_forecast::utils::validation::Validate;
use regression_forecast::{
    ForecastEngine, ForecastError, ForecastPipeline, LoadError, LocalStorage, Locale,
    OutputFormat, RunOptions, TomlConfig, WeightedForecast,
};
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;

struct TestConfig {
    input: String,
    output: String,
    options: RunOptions,
    formats: Vec<OutputFormat>,
}

impl ConfigProvider for TestConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn run_options(&self) -> RunOptions {
        self.options.clone()
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn output_filename(&self) -> &str {
        "resultados_regresion.xlsx"
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        self.formats.clone()
    }

    fn locale(&self) -> Locale {
        Locale::Es
    }
}

fn write_input(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn config(input: String, output: &TempDir, options: RunOptions) -> TestConfig {
    TestConfig {
        input,
        output: output.path().to_str().unwrap().to_string(),
        options,
        formats: vec![OutputFormat::Xlsx, OutputFormat::Csv, OutputFormat::Json],
    }
}

#[test]
fn test_end_to_end_csv_run() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "ventas.csv", "X,Y\n1,2\n2,4\n3,6\n4,8\n");
    let options = RunOptions {
        transpose: false,
        target: Some("Y".to_string()),
        inputs: BTreeMap::from([("X".to_string(), 5.0)]),
    };

    let pipeline = ForecastPipeline::new(LocalStorage::new("."), config(input, &temp_dir, options));
    let summary = ForecastEngine::new(pipeline).run().unwrap();

    let x = summary.evaluation.results.row("X").unwrap();
    assert_relative_eq!(x.slope().unwrap(), 2.0, epsilon = 1e-12);
    assert_relative_eq!(x.intercept().unwrap(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(x.r_squared().unwrap(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(x.forecast().unwrap(), 10.0, epsilon = 1e-12);
    assert_eq!(
        summary.evaluation.weighted.display_value().as_deref(),
        Some("10.00")
    );

    assert_eq!(summary.outputs.len(), 3);
    for name in [
        "resultados_regresion.xlsx",
        "resultados_regresion.csv",
        "resultados_regresion.json",
    ] {
        assert!(temp_dir.path().join(name).exists(), "missing {}", name);
    }

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("resultados_regresion.json")).unwrap())
            .unwrap();
    assert_eq!(json["target"], "Y");
    assert_eq!(json["observations"], 4);
    assert_eq!(json["rows"][0]["variable"], "X");
    assert_eq!(json["weighted_forecast"], 10.0);
    assert!(json["generated_at"].is_string());
}

#[test]
fn test_transposed_input() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(
        &temp_dir,
        "ancho.csv",
        "Variable,Ene,Feb,Mar,Abr\nPublicidad,1,2,3,4\nVentas,3,5,7,9\n",
    );
    let options = RunOptions {
        transpose: true,
        target: Some("Ventas".to_string()),
        inputs: BTreeMap::from([("Publicidad".to_string(), 10.0)]),
    };

    let pipeline = ForecastPipeline::new(LocalStorage::new("."), config(input, &temp_dir, options));
    let summary = ForecastEngine::new(pipeline).with_export(false).run().unwrap();
    let results = &summary.evaluation.results;

    let variables: Vec<&str> = results.iter().map(|r| r.variable.as_str()).collect();
    assert_eq!(variables, vec!["Publicidad"]);

    let publicidad = results.row("Publicidad").unwrap();
    assert_relative_eq!(publicidad.slope().unwrap(), 2.0, epsilon = 1e-12);
    assert_relative_eq!(publicidad.intercept().unwrap(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(publicidad.forecast().unwrap(), 21.0, epsilon = 1e-12);
    assert!(summary.outputs.is_empty());
}

#[test]
fn test_transposed_input_with_year_labels() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(
        &temp_dir,
        "anual.csv",
        "Variable,2020,2021,2022,2023\nPublicidad,1,2,3,4\nVentas,3,5,7,10\n",
    );
    let options = RunOptions {
        transpose: true,
        target: Some("Ventas".to_string()),
        inputs: BTreeMap::from([("Publicidad".to_string(), 5.0)]),
    };

    let pipeline = ForecastPipeline::new(LocalStorage::new("."), config(input, &temp_dir, options));
    let summary = ForecastEngine::new(pipeline).with_export(false).run().unwrap();
    let results = &summary.evaluation.results;

    // year labels are not a predictor
    assert_eq!(results.len(), 1);
    let publicidad = results.row("Publicidad").unwrap();
    assert_relative_eq!(publicidad.slope().unwrap(), 2.3, epsilon = 1e-12);
    assert_relative_eq!(publicidad.intercept().unwrap(), 0.5, epsilon = 1e-12);
    assert_relative_eq!(publicidad.forecast().unwrap(), 12.0, epsilon = 1e-12);
    assert_eq!(
        summary.evaluation.weighted.display_value().as_deref(),
        Some("12.00")
    );
}

#[test]
fn test_uninformative_predictors_give_undefined_forecast() {
    let temp_dir = TempDir::new().unwrap();
    // X is uncorrelated with Y, so its R² is exactly zero.
    let input = write_input(&temp_dir, "plano.csv", "X,Y\n1,1\n2,3\n3,3\n4,1\n");
    let options = RunOptions {
        target: Some("Y".to_string()),
        ..RunOptions::default()
    };

    let pipeline = ForecastPipeline::new(LocalStorage::new("."), config(input, &temp_dir, options));
    let summary = ForecastEngine::new(pipeline).with_export(false).run().unwrap();

    assert_relative_eq!(
        summary.evaluation.results.rows[0].r_squared().unwrap(),
        0.0,
        epsilon = 1e-12
    );
    assert_eq!(summary.evaluation.weighted, WeightedForecast::Undefined);
}

#[test]
fn test_unknown_target_halts_run() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "ventas.csv", "X,Y\n1,2\n2,4\n");
    let options = RunOptions {
        target: Some("Ventas".to_string()),
        ..RunOptions::default()
    };

    let pipeline = ForecastPipeline::new(LocalStorage::new("."), config(input, &temp_dir, options));
    let err = ForecastEngine::new(pipeline).run().unwrap_err();

    assert!(matches!(err, ForecastError::UnknownTarget { .. }));
    assert!(!temp_dir.path().join("resultados_regresion.xlsx").exists());
}

#[test]
fn test_malformed_csv_is_load_error() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "roto.csv", "X,Y\n1,2,3,4\n");

    let pipeline = ForecastPipeline::new(
        LocalStorage::new("."),
        config(input, &temp_dir, RunOptions::default()),
    );
    let err = ForecastEngine::new(pipeline).run().unwrap_err();

    assert!(matches!(err, ForecastError::Load(LoadError::RaggedRow { .. })));
    assert!(err.recovery_suggestion().contains("CSV"));
}

#[test]
fn test_corrupt_workbook_is_load_error() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "roto.xlsx", "X,Y\n1,2\n");

    let pipeline = ForecastPipeline::new(
        LocalStorage::new("."),
        config(input, &temp_dir, RunOptions::default()),
    );
    let err = ForecastEngine::new(pipeline).run().unwrap_err();
    assert!(matches!(err, ForecastError::Load(LoadError::Xlsx(_))));
}

#[test]
fn test_toml_config_drives_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "ventas.csv", "Ventas,Publicidad\n3,1\n5,2\n7,3\n");
    let output_dir = temp_dir.path().join("salida");

    let toml_content = format!(
        r#"
[input]
path = "{}"

[forecast.values]
Publicidad = 4

[output]
path = "{}"
formats = ["xlsx", "csv"]
"#,
        input.replace('\\', "/"),
        output_dir.to_str().unwrap().replace('\\', "/")
    );
    let config = TomlConfig::from_toml_str(&toml_content).unwrap();
    config.validate().unwrap();

    let pipeline = ForecastPipeline::new(LocalStorage::new("."), config);
    let summary = ForecastEngine::new(pipeline).run().unwrap();

    // first column is the default dependent variable
    assert_eq!(summary.evaluation.results.target, "Ventas");
    assert_relative_eq!(
        summary.evaluation.weighted.value().unwrap(),
        9.0,
        epsilon = 1e-12
    );
    assert!(Path::new(&output_dir).join("resultados_regresion.xlsx").exists());
    let csv = std::fs::read_to_string(output_dir.join("resultados_regresion.csv")).unwrap();
    assert!(csv.starts_with("Variable,Pendiente (β),Intersección (α),R²,Pronóstico"));
}
