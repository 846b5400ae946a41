use crate::domain::model::{
    Evaluation, FitOutcome, Locale, OutputFormat, RegressionRow, ResultsTable,
};
use crate::utils::error::ExportError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const DEFAULT_FILENAME: &str = "resultados_regresion.xlsx";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="1"><fill><patternFill patternType="none"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs></styleSheet>"#;

/// Serializes `evaluation` in the requested format.
pub fn export(
    format: OutputFormat,
    evaluation: &Evaluation,
    locale: Locale,
) -> Result<Vec<u8>, ExportError> {
    match format {
        OutputFormat::Xlsx => export_xlsx(&evaluation.results, locale),
        OutputFormat::Csv => export_csv(&evaluation.results, locale),
        OutputFormat::Json => export_json(evaluation),
    }
}

/// Single-sheet workbook: a header row, then one row per regression.
/// Undefined values are written as empty cells.
pub fn export_xlsx(results: &ResultsTable, locale: Locale) -> Result<Vec<u8>, ExportError> {
    let bytes = write_workbook(locale.sheet_name(), &worksheet_xml(results, locale))?;
    tracing::debug!("Built workbook with {} result rows ({} bytes)", results.len(), bytes.len());
    Ok(bytes)
}

/// Packages one worksheet part into an in-memory workbook.
pub(crate) fn write_workbook(sheet_name: &str, sheet_xml: &str) -> Result<Vec<u8>, ExportError> {
    let workbook_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape_xml(sheet_name)
    );

    let parts: [(&str, &str); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", ROOT_RELS_XML),
        ("xl/workbook.xml", &workbook_xml),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML),
        ("xl/styles.xml", STYLES_XML),
        ("xl/worksheets/sheet1.xml", sheet_xml),
    ];

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in parts {
        zip.start_file::<_, ()>(name, FileOptions::default())?;
        zip.write_all(content.as_bytes())?;
    }
    Ok(zip.finish()?.into_inner())
}

fn worksheet_xml(results: &ResultsTable, locale: Locale) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    xml.push_str(r#"<row r="1">"#);
    for (col, header) in locale.result_headers().iter().enumerate() {
        push_text_cell(&mut xml, col, 1, header);
    }
    xml.push_str("</row>");

    for (index, row) in results.iter().enumerate() {
        let line = index + 2;
        xml.push_str(&format!(r#"<row r="{}">"#, line));
        push_text_cell(&mut xml, 0, line, &row.variable);
        for (offset, value) in numeric_fields(row).iter().enumerate() {
            if let Some(v) = value {
                xml.push_str(&format!(
                    r#"<c r="{}{}"><v>{}</v></c>"#,
                    column_letter(offset + 1),
                    line,
                    v
                ));
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn push_text_cell(xml: &mut String, col: usize, line: usize, text: &str) {
    xml.push_str(&format!(
        r#"<c r="{}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
        column_letter(col),
        line,
        escape_xml(text)
    ));
}

fn numeric_fields(row: &RegressionRow) -> [Option<f64>; 4] {
    [row.slope(), row.intercept(), row.r_squared(), row.forecast()]
}

/// Zero-based column index to spreadsheet letters (`0` → `A`, `26` → `AA`).
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Same header and rows as the workbook, as comma-separated text.
pub fn export_csv(results: &ResultsTable, locale: Locale) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(locale.result_headers())?;

    for row in results.iter() {
        let mut record = vec![row.variable.clone()];
        record.extend(
            numeric_fields(row)
                .iter()
                .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    target: &'a str,
    observations: usize,
    rows: Vec<JsonRow<'a>>,
    weighted_forecast: Option<f64>,
}

#[derive(Debug, Serialize)]
struct JsonRow<'a> {
    variable: &'a str,
    slope: Option<f64>,
    intercept: Option<f64>,
    r_squared: Option<f64>,
    forecast: Option<f64>,
    observations: Option<usize>,
    degenerate_reason: Option<String>,
}

impl<'a> From<&'a RegressionRow> for JsonRow<'a> {
    fn from(row: &'a RegressionRow) -> Self {
        let degenerate_reason = match &row.outcome {
            FitOutcome::Degenerate(reason) => Some(reason.to_string()),
            FitOutcome::Fitted(_) => None,
        };
        Self {
            variable: &row.variable,
            slope: row.slope(),
            intercept: row.intercept(),
            r_squared: row.r_squared(),
            forecast: row.forecast(),
            observations: row.fit().map(|f| f.observations),
            degenerate_reason,
        }
    }
}

pub fn export_json(evaluation: &Evaluation) -> Result<Vec<u8>, ExportError> {
    let report = JsonReport {
        generated_at: Utc::now(),
        target: &evaluation.results.target,
        observations: evaluation.table.row_count(),
        rows: evaluation.results.iter().map(JsonRow::from).collect(),
        weighted_forecast: evaluation.weighted.value(),
    };
    Ok(serde_json::to_vec_pretty(&report)?)
}
