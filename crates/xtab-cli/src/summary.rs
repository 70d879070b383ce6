use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use xtab_cli::types::{RenderResult, TableOutcome};
use xtab_model::Axis;
use xtab_taxonomy::VerifySummary;

pub fn print_render_summary(result: &RenderResult) {
    println!(
        "Package: {} ({})",
        result.verify.package.name,
        result.package_dir.display()
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Code"),
        header_cell("Slices"),
        header_cell("Facts"),
        header_cell("Grayed"),
        header_cell("Open axes"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Center);

    let mut total_facts = 0usize;
    let mut total_grayed = 0usize;
    for outcome in &result.tables {
        let row = match &outcome.layout {
            Ok(layout) => {
                total_facts += layout.fact_count();
                total_grayed += layout.grayed_count();
                let open_axes = layout
                    .open_axes
                    .iter()
                    .map(Axis::as_str)
                    .collect::<Vec<_>>()
                    .join(",");
                vec![
                    table_cell(outcome),
                    code_cell(outcome.table_code.as_deref()),
                    Cell::new(layout.slices.len()),
                    Cell::new(layout.fact_count()),
                    count_cell(layout.grayed_count(), Color::Yellow),
                    if open_axes.is_empty() {
                        dim_cell("-")
                    } else {
                        Cell::new(open_axes)
                    },
                    Cell::new("✓")
                        .fg(Color::Green)
                        .add_attribute(Attribute::Bold),
                ]
            }
            Err(_) => vec![
                table_cell(outcome),
                code_cell(outcome.table_code.as_deref()),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
                Cell::new("✗").fg(Color::Red).add_attribute(Attribute::Bold),
            ],
        };
        table.add_row(row);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(total_facts).add_attribute(Attribute::Bold),
        count_cell(total_grayed, Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(result.failed_count(), Color::Red).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    let failures: Vec<_> = result
        .tables
        .iter()
        .filter_map(|outcome| outcome.layout.as_ref().err())
        .collect();
    if !failures.is_empty() {
        eprintln!("Errors:");
        for error in failures {
            eprintln!("- {error}");
        }
    }
}

pub fn print_verify_summary(summary: &VerifySummary) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Package"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Name"), Cell::new(&summary.package.name)]);
    table.add_row(vec![
        Cell::new("Version"),
        optional_cell(summary.package.version.as_deref()),
    ]);
    table.add_row(vec![
        Cell::new("Directory"),
        Cell::new(summary.package_dir.display()),
    ]);
    table.add_row(vec![Cell::new("Files"), Cell::new(summary.file_count)]);
    table.add_row(vec![Cell::new("Concepts"), Cell::new(summary.concept_count)]);
    table.add_row(vec![
        Cell::new("Base sets"),
        Cell::new(summary.base_set_count),
    ]);
    table.add_row(vec![Cell::new("DRS"), Cell::new(summary.drs_count)]);
    table.add_row(vec![Cell::new("Tables"), Cell::new(summary.table_count)]);
    println!("{table}");
    if let Some(text) = &summary.package.summary {
        println!("{text}");
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn table_cell(outcome: &TableOutcome) -> Cell {
    Cell::new(&outcome.table_id)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn code_cell(code: Option<&str>) -> Cell {
    optional_cell(code)
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
