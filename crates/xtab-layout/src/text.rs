#![deny(unsafe_code)]

//! Plain-text dump of a layout, one line per grid row.
//!
//! Tokens: header cells print their label (`_` when blank) with `:Nc` /
//! `:Nr` span suffixes, a leading `>` per indent level and a trailing `#`
//! when grayed; fillers print `.`; facts print `[address]`, `[#address]`
//! when grayed.

use std::fmt::Write;

use xtab_model::{Cell, CellAddress, Layout};

pub fn render_text(layout: &Layout) -> String {
    let mut out = String::new();
    match &layout.table_code {
        Some(code) => {
            let _ = writeln!(out, "table {} ({code})", layout.table_id);
        }
        None => {
            let _ = writeln!(out, "table {}", layout.table_id);
        }
    }
    for (idx, slice) in layout.slices.iter().enumerate() {
        let _ = write!(out, "== slice {}", idx + 1);
        if let Some(code) = &slice.code {
            let _ = write!(out, " [{code}]");
        }
        if let Some(label) = &slice.label {
            let _ = write!(out, " {label}");
        }
        out.push('\n');
        for row in &slice.rows {
            let tokens: Vec<String> = row.iter().map(cell_token).collect();
            let _ = writeln!(out, "{}", tokens.join(" | "));
        }
    }
    out
}

fn cell_token(cell: &Cell) -> String {
    if cell.is_fact {
        let address = cell.address.as_ref().map(CellAddress::key).unwrap_or_default();
        let mark = if cell.is_grayed { "#" } else { "" };
        return format!("[{mark}{address}]");
    }
    if !cell.is_header {
        return ".".to_string();
    }

    let mut token = ">".repeat(cell.indent);
    token.push_str(if cell.label.is_empty() { "_" } else { &cell.label });
    if cell.col_span > 1 {
        let _ = write!(token, ":{}c", cell.col_span);
    }
    if cell.row_span > 1 {
        let _ = write!(token, ":{}r", cell.row_span);
    }
    if cell.is_grayed {
        token.push('#');
    }
    token
}
