//! FILENAME: server/src/csv.rs
//! PURPOSE: Serializes the engine's output table to CSV text.
//! CONTEXT: Header-less, comma-delimited, CRLF row terminator. Numbers are
//! rendered without engine formatting, strings verbatim; a field containing
//! a delimiter, quote, or line break is quote-wrapped with embedded quotes
//! doubled, so any standard CSV parser round-trips the cells exactly.

use engine_bridge::{CellValue, OutputTable};

/// Row terminator. CRLF, explicitly, on every platform.
pub const ROW_TERMINATOR: &str = "\r\n";

/// Encode the whole table; one output line per table row.
pub fn to_csv(table: &OutputTable) -> String {
    let mut out = String::new();
    for row in table.rows() {
        for (index, cell) in row.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            encode_field(&render_cell(cell), &mut out);
        }
        out.push_str(ROW_TERMINATOR);
    }
    out
}

/// The natural textual representation of one cell.
fn render_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Number(n) => {
            // Format without unnecessary decimal places
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{:.0}", n)
            } else {
                format!("{}", n)
            }
        }
        CellValue::Text(s) => s.clone(),
        CellValue::Boolean(b) => {
            if *b { "TRUE" } else { "FALSE" }.to_string()
        }
    }
}

fn needs_quoting(text: &str) -> bool {
    text.contains(',') || text.contains('"') || text.contains('\n') || text.contains('\r')
}

fn encode_field(text: &str, out: &mut String) {
    if !needs_quoting(text) {
        out.push_str(text);
        return;
    }
    out.push('"');
    for c in text.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}
