//! Layout - the renderable output of a compiled table.
//!
//! A layout is an ordered list of table slices (one per Z entry), each an
//! ordered list of rows of [`Cell`]s. Rendering to HTML/JSON happens
//! downstream without further business logic.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Aspect, Axis, MemberValue, QName};

/// A resolved aspect constraint of a fact cell, with the axis that set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub aspect: Aspect,
    pub value: MemberValue,
    pub axis: Axis,
}

/// Row/column code pair locating a fact cell, plus the sheet code when the
/// table has more than one slice.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    pub row: String,
    pub column: String,
}

impl CellAddress {
    pub fn new(row: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            sheet: None,
            row: row.into(),
            column: column.into(),
        }
    }

    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    /// `"{row}.{column}"`, prefixed with `"{sheet}."` when a sheet is set.
    pub fn key(&self) -> String {
        match &self.sheet {
            Some(sheet) => format!("{}.{}.{}", sheet, self.row, self.column),
            None => format!("{}.{}", self.row, self.column),
        }
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// A single grid position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub label: String,
    pub col_span: usize,
    pub row_span: usize,
    /// Indentation level (row headers show hierarchy this way).
    pub indent: usize,
    pub is_header: bool,
    pub is_fact: bool,
    pub is_fake: bool,
    pub is_grayed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<CellAddress>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub constraints: BTreeMap<Aspect, Constraint>,
}

impl Cell {
    fn blank() -> Self {
        Cell {
            label: String::new(),
            col_span: 1,
            row_span: 1,
            indent: 0,
            is_header: false,
            is_fact: false,
            is_fake: false,
            is_grayed: false,
            address: None,
            constraints: BTreeMap::new(),
        }
    }

    /// Creates a header cell.
    pub fn header(label: impl Into<String>) -> Self {
        Cell {
            label: label.into(),
            is_header: true,
            ..Cell::blank()
        }
    }

    /// Creates the top-left corner cell.
    pub fn corner(col_span: usize, row_span: usize) -> Self {
        Cell {
            col_span,
            row_span,
            is_header: true,
            ..Cell::blank()
        }
    }

    /// Creates an empty, non-header filler cell.
    pub fn filler() -> Self {
        Cell::blank()
    }

    /// Creates a fact cell at `address`.
    pub fn fact(address: CellAddress) -> Self {
        Cell {
            is_fact: true,
            address: Some(address),
            ..Cell::blank()
        }
    }

    pub fn with_col_span(mut self, span: usize) -> Self {
        self.col_span = span.max(1);
        self
    }

    pub fn with_row_span(mut self, span: usize) -> Self {
        self.row_span = span.max(1);
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_fake(mut self, fake: bool) -> Self {
        self.is_fake = fake;
        self
    }

    pub fn with_grayed(mut self, grayed: bool) -> Self {
        self.is_grayed = grayed;
        self
    }

    /// Sets `aspect` unless a nearer constraint already did.
    ///
    /// Returns true when the value was written.
    pub fn merge_constraint(&mut self, aspect: &Aspect, value: &MemberValue, axis: Axis) -> bool {
        if self.constraints.contains_key(aspect) {
            return false;
        }
        self.constraints.insert(
            aspect.clone(),
            Constraint {
                aspect: aspect.clone(),
                value: value.clone(),
                axis,
            },
        );
        true
    }

    pub fn constraint(&self, aspect: &Aspect) -> Option<&Constraint> {
        self.constraints.get(aspect)
    }

    /// The fixed `concept` constraint, if any.
    pub fn concept(&self) -> Option<&QName> {
        self.constraints
            .get(&Aspect::Concept)
            .and_then(|constraint| constraint.value.member())
    }
}

/// One sheet of the table (one closed Z entry).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSlice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TableSlice {
    pub fn fact_cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten().filter(|cell| cell.is_fact)
    }
}

/// Compiled output for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub table_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_code: Option<String>,
    pub slices: Vec<TableSlice>,
    /// Open aspects found while resolving cell constraints, by axis.
    #[serde(default)]
    pub open_dimensions: BTreeMap<Aspect, Axis>,
    /// Axes carrying at least one aspect node.
    #[serde(default)]
    pub open_axes: BTreeSet<Axis>,
}

impl Layout {
    pub fn fact_cells(&self) -> impl Iterator<Item = &Cell> {
        self.slices.iter().flat_map(TableSlice::fact_cells)
    }

    pub fn fact_count(&self) -> usize {
        self.fact_cells().count()
    }

    pub fn grayed_count(&self) -> usize {
        self.fact_cells().filter(|cell| cell.is_grayed).count()
    }

    pub fn is_open(&self) -> bool {
        !self.open_axes.is_empty()
    }
}
