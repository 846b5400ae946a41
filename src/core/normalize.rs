use crate::domain::model::{NumericColumn, NumericTable, RowLabels, TextTable};

/// Optional transpose followed by numeric coercion. Never fails.
pub fn normalize(table: &TextTable, transpose_first: bool) -> NumericTable {
    if transpose_first {
        let transposed = transpose(table);
        tracing::debug!(
            "Transposed table to {} columns and {} rows",
            transposed.width(),
            transposed.height()
        );
        coerce(&transposed)
    } else {
        coerce(table)
    }
}

/// Swaps rows and columns and promotes the new first row to header.
///
/// On a plain table the first column's values become the header and the old
/// header names become row labels, so they never reach coercion as a column.
/// On a labelled table the labels are folded back in as the first column, which
/// makes transposing twice give back the original table.
pub fn transpose(table: &TextTable) -> TextTable {
    let labels = table.row_labels();

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(table.height() + 1);
    grid.push(
        labels
            .map(|l| l.name.clone())
            .into_iter()
            .chain(table.headers().iter().cloned())
            .collect(),
    );
    for (index, row) in table.rows().iter().enumerate() {
        grid.push(
            labels
                .map(|l| l.values[index].clone())
                .into_iter()
                .chain(row.iter().cloned())
                .collect(),
        );
    }

    let grid_width = grid[0].len();
    let mut lines =
        (0..grid_width).map(|col| grid.iter().map(|row| row[col].clone()).collect::<Vec<_>>());

    if labels.is_some() {
        return match lines.next() {
            Some(headers) => TextTable::new(headers, lines.collect()),
            None => TextTable::new(Vec::new(), Vec::new()),
        };
    }

    let (mut names, mut body): (Vec<String>, Vec<Vec<String>>) = lines
        .map(|line| {
            let mut cells = line.into_iter();
            let name = cells.next().unwrap_or_default();
            (name, cells.collect())
        })
        .unzip();

    if names.is_empty() {
        return TextTable::new(Vec::new(), Vec::new());
    }
    let label_name = names.remove(0);
    let headers = body.remove(0);

    TextTable::new(headers, body).with_row_labels(RowLabels {
        name: label_name,
        values: names,
    })
}

/// Converts every cell to a finite number or a missing marker.
pub fn coerce(table: &TextTable) -> NumericTable {
    let columns: Vec<NumericColumn> = table
        .headers()
        .iter()
        .enumerate()
        .map(|(col, name)| NumericColumn {
            name: name.clone(),
            values: table.rows().iter().map(|row| parse_cell(&row[col])).collect(),
        })
        .collect();

    for column in &columns {
        if table.height() > 0 && column.values.iter().all(Option::is_none) {
            tracing::debug!("Column '{}' has no numeric values", column.name);
        }
    }

    NumericTable::new(columns, table.height())
}

pub fn parse_cell(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_table(headers: &[&str], rows: &[&[&str]]) -> TextTable {
        TextTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell(" 1.5 "), Some(1.5));
        assert_eq!(parse_cell("-2e3"), Some(-2000.0));
        assert_eq!(parse_cell(""), None);
        assert_eq!(parse_cell("abc"), None);
        assert_eq!(parse_cell("NaN"), None);
        assert_eq!(parse_cell("inf"), None);
    }

    #[test]
    fn test_coerce_keeps_non_numeric_columns() {
        let table = text_table(&["Name", "X"], &[&["a", "1"], &["b", "x"]]);
        let numeric = coerce(&table);

        assert_eq!(numeric.columns().len(), 2);
        assert_eq!(numeric.column("Name").unwrap().values, vec![None, None]);
        assert_eq!(numeric.column("X").unwrap().values, vec![Some(1.0), None]);
        assert_eq!(numeric.row_count(), 2);
    }

    #[test]
    fn test_transpose_promotes_first_column_to_header() {
        let table = text_table(
            &["Variable", "2020", "2021"],
            &[&["Ventas", "10", "20"], &["Publicidad", "1", "2"]],
        );
        let transposed = transpose(&table);

        assert_eq!(
            transposed.headers(),
            &["Ventas".to_string(), "Publicidad".to_string()]
        );
        assert_eq!(
            transposed.rows(),
            &[
                vec!["10".to_string(), "1".to_string()],
                vec!["20".to_string(), "2".to_string()],
            ]
        );
        assert_eq!(
            transposed.row_labels(),
            Some(&RowLabels {
                name: "Variable".to_string(),
                values: vec!["2020".to_string(), "2021".to_string()],
            })
        );
    }

    #[test]
    fn test_transpose_drops_numeric_header_labels() {
        let table = text_table(
            &["Variable", "2020", "2021", "2022"],
            &[&["Publicidad", "1", "2", "3"], &["Ventas", "3", "5", "7"]],
        );
        let numeric = normalize(&table, true);

        let names: Vec<&str> = numeric.column_names().collect();
        assert_eq!(names, vec!["Publicidad", "Ventas"]);
        assert_eq!(numeric.row_count(), 3);
        assert!(numeric.column("Variable").is_none());
    }

    #[test]
    fn test_transpose_twice_restores_table() {
        let table = text_table(&["X", "Y", "Z"], &[&["1", "2", "3"], &["4", "5", "6"]]);
        let restored = transpose(&transpose(&table));
        assert_eq!(restored, table);
        assert!(restored.row_labels().is_none());
    }

    #[test]
    fn test_transpose_without_rows_keeps_labels_only() {
        let table = text_table(&["X", "Y"], &[]);
        let transposed = transpose(&table);
        assert_eq!(transposed.width(), 0);
        assert_eq!(transposed.row_labels().unwrap().values, vec!["Y".to_string()]);
        assert_eq!(transpose(&transposed), table);
    }

    #[test]
    fn test_transpose_empty_table() {
        let table = TextTable::new(Vec::new(), Vec::new());
        assert_eq!(transpose(&table).width(), 0);
    }

    #[test]
    fn test_normalize_with_transpose() {
        let table = text_table(&["Mes", "Ene", "Feb"], &[&["X", "1", "2"], &["Y", "2", "4"]]);
        let numeric = normalize(&table, true);

        let names: Vec<&str> = numeric.column_names().collect();
        assert_eq!(names, vec!["X", "Y"]);
        assert_eq!(numeric.column("X").unwrap().values, vec![Some(1.0), Some(2.0)]);
        assert_eq!(numeric.column("Y").unwrap().values, vec![Some(2.0), Some(4.0)]);
    }
}
