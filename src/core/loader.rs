use crate::domain::model::{InputFormat, TextTable};
use crate::utils::error::LoadError;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use csv::ReaderBuilder;
use std::io::Cursor;

/// Parses an uploaded file into a text table. The first row is the header.
pub fn load_table(bytes: &[u8], format: InputFormat) -> Result<TextTable, LoadError> {
    let table = match format {
        InputFormat::Csv => load_csv(bytes)?,
        InputFormat::Xlsx => load_xlsx(bytes)?,
    };

    tracing::debug!(
        "Loaded {:?} table with {} columns and {} rows",
        format,
        table.width(),
        table.height()
    );
    Ok(table)
}

pub fn load_csv(bytes: &[u8]) -> Result<TextTable, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = rdr.headers()?.iter().map(|s| s.to_string()).collect();
    if headers.is_empty() {
        return Err(LoadError::Empty);
    }

    let mut rows = Vec::new();
    for (index, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            return Err(LoadError::RaggedRow {
                row: index + 1,
                expected: headers.len(),
                found: record.len(),
            });
        }
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(TextTable::new(headers, rows))
}

pub fn load_xlsx(bytes: &[u8]) -> Result<TextTable, LoadError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let sheet_count = workbook.sheet_names().len();

    let mut range = None;
    for idx in 0..sheet_count {
        match workbook.worksheet_range_at(idx) {
            Some(Ok(r)) => {
                range = Some(r);
                break;
            }
            Some(Err(e)) => tracing::warn!("Skipping unreadable sheet #{}: {}", idx, e),
            None => {}
        }
    }
    let range = range.ok_or(LoadError::NoSheet)?;

    // The range begins at the first non-empty cell. Leading blank rows are
    // skipped, but leading blank columns stay so column positions match the sheet.
    let leading_columns = range.start().map_or(0, |(_, col)| col as usize);
    let padded = |row: &[Data]| -> Vec<String> {
        std::iter::repeat(String::new())
            .take(leading_columns)
            .chain(row.iter().map(cell_text))
            .collect()
    };

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(row) => padded(row),
        None => return Err(LoadError::Empty),
    };
    let rows = rows.map(padded).collect();

    Ok(TextTable::new(headers, rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
