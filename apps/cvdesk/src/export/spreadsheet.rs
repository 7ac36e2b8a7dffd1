//! One-sheet workbook: a header row of field names, a single row of values.

use rust_xlsxwriter::Workbook;
use serde_json::Value;

use crate::export::ExportError;
use crate::models::record::FIELD_NAMES;
use crate::models::{ApplicationRecord, ImageSlot};

pub const SHEET_NAME: &str = "CV";

/// Longest text an xlsx cell accepts.
pub const MAX_CELL_CHARS: usize = 32_767;

/// `(column header, cell text)` for every field present on the record, in
/// canonical field order. Sets become JSON array text.
pub fn spreadsheet_columns(record: &ApplicationRecord) -> Result<Vec<(String, String)>, ExportError> {
    let value = serde_json::to_value(record)?;
    let Value::Object(fields) = value else {
        return Ok(Vec::new());
    };

    let mut columns = Vec::with_capacity(fields.len());
    for name in FIELD_NAMES {
        let Some(field) = fields.get(name) else {
            continue;
        };
        let text = match field {
            Value::String(s) => s.clone(),
            other => serde_json::to_string(other)?,
        };
        columns.push((name.to_string(), fit_cell(name, text)));
    }
    Ok(columns)
}

/// Oversized values are replaced by a size note. Image columns say so.
fn fit_cell(field: &str, text: String) -> String {
    let chars = text.chars().count();
    if chars <= MAX_CELL_CHARS {
        text
    } else if ImageSlot::from_form_field(field).is_some() {
        format!("[image data: {chars} chars]")
    } else {
        format!("[truncated: {chars} chars]")
    }
}

pub fn build_workbook(record: &ApplicationRecord) -> Result<Vec<u8>, ExportError> {
    let columns = spreadsheet_columns(record)?;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (header, value)) in columns.iter().enumerate() {
        let col = col as u16;
        sheet.write_string(0, col, header.as_str())?;
        sheet.write_string(1, col, value.as_str())?;
    }

    Ok(workbook.save_to_buffer()?)
}
