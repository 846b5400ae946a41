use crate::domain::model::{FitOutcome, Locale, ResultsTable, WeightedForecast};

const UNDEFINED: &str = "—";

/// Aligned plain-text table of the regression results.
pub fn render_results(results: &ResultsTable, locale: Locale) -> String {
    let headers = locale.result_headers();
    let mut lines: Vec<[String; 5]> = Vec::with_capacity(results.len());
    let mut notes = Vec::new();

    for row in results.iter() {
        match &row.outcome {
            FitOutcome::Fitted(fit) => lines.push([
                row.variable.clone(),
                format_number(fit.slope),
                format_number(fit.intercept),
                format_number(fit.r_squared),
                format_number(fit.forecast),
            ]),
            FitOutcome::Degenerate(reason) => {
                lines.push([
                    row.variable.clone(),
                    UNDEFINED.to_string(),
                    UNDEFINED.to_string(),
                    UNDEFINED.to_string(),
                    UNDEFINED.to_string(),
                ]);
                notes.push(format!("  {} {}: {}", UNDEFINED, row.variable, reason));
            }
        }
    }

    let mut widths = headers.map(|h| h.chars().count());
    for line in &lines {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &headers.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for line in &lines {
        push_line(&mut out, line, &widths);
    }
    for note in notes {
        out.push_str(&note);
        out.push('\n');
    }
    out
}

/// `Pronóstico ponderado: 10.00`, or the localized cannot-compute notice.
pub fn render_weighted(weighted: &WeightedForecast, locale: Locale) -> String {
    match weighted.display_value() {
        Some(value) => format!("{}: {}", locale.weighted_label(), value),
        None => format!("⚠ {}", locale.cannot_compute_notice()),
    }
}

fn push_line(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(col, (cell, width))| {
            let pad = width.saturating_sub(cell.chars().count());
            if col == 0 {
                format!("{}{}", cell, " ".repeat(pad))
            } else {
                format!("{}{}", " ".repeat(pad), cell)
            }
        })
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

fn format_number(value: f64) -> String {
    format!("{:.4}", value)
}
