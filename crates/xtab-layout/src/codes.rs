#![deny(unsafe_code)]

//! Row/column code assignment.

use std::collections::BTreeSet;

use xtab_compile::{CompiledTable, StructureNode};

const CODE_START: u32 = 10;
const CODE_STEP: u32 = 10;
const CODE_WIDTH: usize = 4;

/// Generates `0010`, `0020`, ... for entries without a code label. One
/// counter per axis, threaded through the layout pass. Codes already taken
/// by labelled entries of the same axis are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeCounter {
    next: u32,
    reserved: BTreeSet<String>,
}

impl Default for CodeCounter {
    fn default() -> Self {
        Self {
            next: CODE_START,
            reserved: BTreeSet::new(),
        }
    }
}

impl CodeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reserved(reserved: impl IntoIterator<Item = String>) -> Self {
        Self {
            reserved: reserved.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn next_code(&mut self) -> String {
        loop {
            let code = format!("{:0>width$}", self.next, width = CODE_WIDTH);
            self.next += CODE_STEP;
            if !self.reserved.contains(&code) {
                return code;
            }
        }
    }
}

/// The labelled code of an axis entry: its row-code label when the table
/// uses them, else its database id when the table uses those.
pub fn label_code(table: &CompiledTable, node: &StructureNode) -> Option<String> {
    table
        .has_row_codes
        .then(|| node.labels.row_code.clone())
        .flatten()
        .or_else(|| {
            table
                .has_database_ids
                .then(|| node.labels.database_id.clone())
                .flatten()
        })
}

/// The code of an axis entry: its labelled code, else a generated one.
pub fn code_for(table: &CompiledTable, node: &StructureNode, counter: &mut CodeCounter) -> String {
    label_code(table, node).unwrap_or_else(|| counter.next_code())
}
