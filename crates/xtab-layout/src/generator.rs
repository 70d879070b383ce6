#![deny(unsafe_code)]

//! Layout generator: headers → slices of rows of cells.

use std::collections::BTreeMap;

use tracing::info;
use xtab_compile::{CompiledTable, Header, Headers, NodeId, StructureNode};
use xtab_model::{Aspect, Axis, Cell, CellAddress, Layout, TableSlice};
use xtab_taxonomy::TaxonomyIndex;
use xtab_validate::{CellNodes, resolve_and_validate};

use crate::codes::{CodeCounter, code_for, label_code};

/// One rendered column, row or sheet. `node` is `None` for the placeholder
/// of an axis without closed entries.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AxisEntry {
    node: Option<NodeId>,
    visible: bool,
    code: String,
}

struct AxisEntries {
    closed: Vec<AxisEntry>,
    open: Vec<NodeId>,
}

impl AxisEntries {
    fn is_placeholder(&self) -> bool {
        self.closed.len() == 1 && self.closed[0].node.is_none()
    }
}

/// Splits the deepest header level into open entries (aspect nodes) and
/// closed entries, assigning codes to the closed ones.
fn split_axis(table: &CompiledTable, header: &Header) -> AxisEntries {
    let tree = table.axis(header.axis);
    let source_of = move |id: NodeId| {
        let node = tree.node(id);
        node.copy_of.map_or(node, |source| tree.node(source))
    };
    let mut counter = CodeCounter::with_reserved(
        header
            .deepest()
            .iter()
            .filter(|entry| !tree.node(entry.node).origin.is_aspect())
            .filter_map(|entry| label_code(table, source_of(entry.node))),
    );
    let mut closed = Vec::new();
    let mut open = Vec::new();

    for entry in header.deepest() {
        if tree.node(entry.node).origin.is_aspect() {
            open.push(entry.node);
            continue;
        }
        let source = source_of(entry.node);
        closed.push(AxisEntry {
            node: Some(entry.node),
            visible: entry.visible,
            code: code_for(table, source, &mut counter),
        });
    }

    if closed.is_empty() {
        closed.push(AxisEntry {
            node: None,
            visible: false,
            code: counter.next_code(),
        });
    }
    AxisEntries { closed, open }
}

/// Builds the grid of `table` and resolves and validates every fact cell.
pub fn lay_out(table: &CompiledTable, headers: &Headers, taxonomy: &TaxonomyIndex) -> Layout {
    let x = split_axis(table, &headers.x);
    let y = split_axis(table, &headers.y);
    let z = split_axis(table, &headers.z);

    let mut sheets: Vec<&AxisEntry> = z
        .closed
        .iter()
        .filter(|entry| !entry.node.is_some_and(|id| table.z.node(id).is_abstract))
        .collect();
    let placeholder_sheet = AxisEntry {
        node: None,
        visible: false,
        code: String::new(),
    };
    if sheets.is_empty() {
        sheets.push(&placeholder_sheet);
    }
    let multi_sheet = sheets.len() > 1;

    let open: Vec<(Axis, NodeId)> = [(Axis::X, &x), (Axis::Y, &y), (Axis::Z, &z)]
        .into_iter()
        .flat_map(|(axis, entries)| entries.open.iter().map(move |&id| (axis, id)))
        .collect();

    let generator = Generator {
        table,
        taxonomy,
        x_header: &headers.x,
        x: &x,
        y: &y,
        open: &open,
        column_spans: closed_spans(table, Axis::X, &x),
    };

    let mut open_dimensions = BTreeMap::new();
    let slices: Vec<TableSlice> = sheets
        .into_iter()
        .map(|sheet| {
            let sheet_code = multi_sheet.then(|| sheet.code.clone());
            generator.slice(sheet, sheet_code, &mut open_dimensions)
        })
        .collect();

    let layout = Layout {
        table_id: table.id.clone(),
        table_code: table.code.clone(),
        slices,
        open_dimensions,
        open_axes: table.open_axes().collect(),
    };
    info!(
        table = %layout.table_id,
        slices = layout.slices.len(),
        facts = layout.fact_count(),
        grayed = layout.grayed_count(),
        "layout generated"
    );
    layout
}

/// Closed deepest entries below each node of `axis`.
fn closed_spans(table: &CompiledTable, axis: Axis, entries: &AxisEntries) -> BTreeMap<NodeId, usize> {
    let tree = table.axis(axis);
    let mut spans = BTreeMap::new();
    for id in entries.closed.iter().filter_map(|entry| entry.node) {
        for ancestor in tree.ancestors(id) {
            *spans.entry(ancestor).or_insert(0) += 1;
        }
    }
    spans
}

struct Generator<'a> {
    table: &'a CompiledTable,
    taxonomy: &'a TaxonomyIndex,
    x_header: &'a Header,
    x: &'a AxisEntries,
    y: &'a AxisEntries,
    open: &'a [(Axis, NodeId)],
    column_spans: BTreeMap<NodeId, usize>,
}

impl Generator<'_> {
    fn slice(
        &self,
        sheet: &AxisEntry,
        sheet_code: Option<String>,
        open_dimensions: &mut BTreeMap<Aspect, Axis>,
    ) -> TableSlice {
        let mut rows = self.header_rows();

        for row in &self.y.closed {
            let mut cells: Vec<Cell> = self.y.open.iter().map(|_| Cell::filler()).collect();
            cells.push(self.row_label(row));
            cells.push(Cell::header(row.code.clone()));

            for column in &self.x.closed {
                let address = CellAddress::new(row.code.clone(), column.code.clone())
                    .with_sheet(sheet_code.clone());
                let mut cell = Cell::fact(address).with_grayed(
                    self.is_grayed_entry(Axis::X, column) || self.is_grayed_entry(Axis::Y, row),
                );
                let nodes =
                    CellNodes::new(column.node, row.node, sheet.node).with_open(self.open);
                resolve_and_validate(&mut cell, self.table, &nodes, self.taxonomy, open_dimensions);
                cells.push(cell);
            }
            rows.push(cells);
        }

        let label = sheet
            .node
            .and_then(|id| self.table.z.node(id).caption.clone());
        TableSlice {
            code: sheet.node.map(|_| sheet.code.clone()),
            label,
            rows,
        }
    }

    /// Column header rows, the column code row and, with open row aspects,
    /// the row of open aspect captions.
    fn header_rows(&self) -> Vec<Vec<Cell>> {
        let x_levels = self.x_header.depth().max(1);
        let corner = Cell::corner(self.y.open.len() + 2, x_levels + 1);
        let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(x_levels + 2);

        if self.x.is_placeholder() {
            rows.push(vec![corner, Cell::header("").with_row_span(x_levels)]);
            rows.extend((1..x_levels).map(|_| Vec::new()));
        } else {
            let tree = &self.table.x;
            for level in 1..=x_levels {
                let mut row = Vec::new();
                if level == 1 {
                    row.push(corner.clone());
                }
                for entry in self.x_header.level(level) {
                    let span = self.column_spans.get(&entry.node).copied().unwrap_or(0);
                    if span == 0 {
                        continue;
                    }
                    let node = tree.node(entry.node);
                    let label = if entry.visible && !node.is_copy() && !node.is_fake {
                        node.caption.clone().unwrap_or_default()
                    } else {
                        String::new()
                    };
                    row.push(
                        Cell::header(label)
                            .with_col_span(span)
                            .with_fake(node.is_fake)
                            .with_grayed(node.is_abstract || node.is_fake),
                    );
                }
                rows.push(row);
            }
        }

        rows.push(
            self.x
                .closed
                .iter()
                .map(|column| Cell::header(column.code.clone()))
                .collect(),
        );

        if !self.y.open.is_empty() {
            let mut row: Vec<Cell> = self
                .y
                .open
                .iter()
                .map(|&id| {
                    Cell::header(self.table.y.node(id).caption.clone().unwrap_or_default())
                        .with_grayed(true)
                })
                .collect();
            row.push(Cell::header(""));
            row.push(Cell::header(""));
            row.extend(self.x.closed.iter().map(|_| Cell::filler()));
            rows.push(row);
        }
        rows
    }

    fn row_label(&self, row: &AxisEntry) -> Cell {
        let Some(id) = row.node else {
            return Cell::header("");
        };
        let tree = &self.table.y;
        let node = tree.node(id);
        let source = node.copy_of.unwrap_or(id);
        let label = if row.visible {
            tree.node(source).caption.clone().unwrap_or_default()
        } else {
            String::new()
        };
        let indent = tree
            .ancestors(source)
            .skip(1)
            .filter(|&ancestor| is_indenting(tree.node(ancestor)))
            .count();
        Cell::header(label)
            .with_indent(indent)
            .with_fake(node.is_fake)
            .with_grayed(node.is_abstract || node.is_fake)
    }

    fn is_grayed_entry(&self, axis: Axis, entry: &AxisEntry) -> bool {
        entry.node.is_some_and(|id| {
            let node = self.table.axis(axis).node(id);
            node.is_abstract || node.is_fake
        })
    }
}

fn is_indenting(node: &StructureNode) -> bool {
    !node.is_breakdown() && !node.is_fake
}
