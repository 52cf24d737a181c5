use super::themed_table::TableColors;
use crate::backend::model::{Column, ColumnType, Row as Record};
use crate::config::TableConfig;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ratatui::prelude::*;
use ratatui::widgets::*;
use serde_json::Value;

/// Display settings for cell values.
#[derive(Debug, Clone)]
pub struct CellFormat {
    pub id_column: String,
    pub date_format: String,
    pub currency_symbol: String,
}

impl CellFormat {
    pub fn from_config(config: &TableConfig) -> Self {
        Self {
            id_column: config.id_column.clone(),
            date_format: config.date_format.clone(),
            currency_symbol: config.currency_symbol.clone(),
        }
    }
}

impl Default for CellFormat {
    fn default() -> Self {
        Self::from_config(&TableConfig::default())
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_currency(amount: f64, symbol: &str) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((&fixed, "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{symbol}{}.{cents}", group_thousands(whole))
}

fn format_date(raw: &str, format: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(format).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format(format).to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format(format).to_string();
    }
    raw.to_string()
}

pub fn format_cell(value: &Value, column_type: ColumnType, format: &CellFormat) -> String {
    match (column_type, value) {
        (_, Value::Null) => String::new(),
        (ColumnType::Currency, Value::Number(n)) => match n.as_f64() {
            Some(f) => format_currency(f, &format.currency_symbol),
            None => n.to_string(),
        },
        (ColumnType::Date, Value::String(s)) => format_date(s, &format.date_format),
        (_, Value::String(s)) => s.clone(),
        (_, other) => other.to_string(),
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

pub fn header_checkbox(all_selected: bool) -> &'static str {
    checkbox(all_selected)
}

/// Builds one table row: checkbox, then a cell per column.
///
/// The id column shows an `Edit` link instead of its raw value.
#[allow(clippy::too_many_arguments)]
pub fn render(
    i: usize,
    record: &Record,
    columns: &[Column],
    checked: bool,
    active: bool,
    text_color: Color,
    format: &CellFormat,
    colors: &TableColors,
) -> Row<'static> {
    let bg = if i % 2 == 0 {
        colors.normal_row_color
    } else {
        colors.alt_row_color
    };

    let mut cells = vec![Cell::from(checkbox(checked))];
    for column in columns {
        let cell = if column.name == format.id_column {
            Cell::from(Span::styled(
                "Edit",
                Style::default().add_modifier(Modifier::UNDERLINED),
            ))
        } else {
            let text = record
                .get(&column.name)
                .map(|v| format_cell(v, column.column_type, format))
                .unwrap_or_default();
            let line = Line::from(text);
            if column.column_type.is_numeric() {
                Cell::from(line.alignment(Alignment::Right))
            } else {
                Cell::from(line)
            }
        };
        cells.push(cell);
    }

    let style = if active {
        colors.active_row_style.bg(bg)
    } else {
        Style::default().fg(text_color).bg(bg)
    };
    Row::new(cells).style(style)
}
