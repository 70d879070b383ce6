#![deny(unsafe_code)]

//! Constraint resolution: merges the rule sets of a cell's axis entries and
//! their ancestors onto the cell.

use std::collections::{BTreeMap, BTreeSet};

use xtab_compile::{CompiledTable, NodeId};
use xtab_model::{Aspect, Axis, Cell, ConstraintSet, RuleSets};

/// The axis entries a fact cell sits at. `None` stands for the placeholder
/// entry of an axis without closed entries. `open` lists the open (aspect)
/// entries of the table; they constrain every fact cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellNodes<'a> {
    pub x: Option<NodeId>,
    pub y: Option<NodeId>,
    pub z: Option<NodeId>,
    pub open: &'a [(Axis, NodeId)],
}

impl<'a> CellNodes<'a> {
    pub fn new(x: Option<NodeId>, y: Option<NodeId>, z: Option<NodeId>) -> Self {
        Self {
            x,
            y,
            z,
            open: &[],
        }
    }

    pub fn with_open(mut self, open: &'a [(Axis, NodeId)]) -> Self {
        self.open = open;
        self
    }

    /// `(axis, node)` pairs in resolution order: x, y, z, then open entries.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, NodeId)> + '_ {
        [(Axis::X, self.x), (Axis::Y, self.y), (Axis::Z, self.z)]
            .into_iter()
            .filter_map(|(axis, node)| node.map(|node| (axis, node)))
            .chain(self.open.iter().copied())
    }
}

/// Merges constraints onto `cell`; the first value written for an aspect is
/// kept.
///
/// Tagged rule sets selected by any of the cell's nodes (or their
/// ancestors) go first, then the default sets. Within each pass the axes are
/// walked x, y, z, each from the entry up to its root, followed by the open
/// entries. Open values are
/// recorded in `open_dimensions` under the axis that set them.
pub fn resolve(
    cell: &mut Cell,
    table: &CompiledTable,
    nodes: &CellNodes<'_>,
    open_dimensions: &mut BTreeMap<Aspect, Axis>,
) {
    let selectors = tag_selectors(table, nodes);
    for tag in &selectors {
        merge_pass(cell, table, nodes, |rules| rules.tagged(tag));
    }
    merge_pass(cell, table, nodes, |rules| Some(&rules.default));

    for constraint in cell.constraints.values() {
        if constraint.value.is_open() {
            open_dimensions
                .entry(constraint.aspect.clone())
                .or_insert(constraint.axis);
        }
    }
}

fn tag_selectors(table: &CompiledTable, nodes: &CellNodes<'_>) -> BTreeSet<String> {
    let mut selectors = BTreeSet::new();
    for (axis, entry) in nodes.iter() {
        let tree = table.axis(axis);
        for id in tree.ancestors(entry) {
            if let Some(tag) = &tree.node(id).tag_selector {
                selectors.insert(tag.clone());
            }
        }
    }
    selectors
}

fn merge_pass<'a>(
    cell: &mut Cell,
    table: &'a CompiledTable,
    nodes: &CellNodes<'_>,
    select: impl Fn(&'a RuleSets) -> Option<&'a ConstraintSet>,
) {
    for (axis, entry) in nodes.iter() {
        let tree = table.axis(axis);
        for id in tree.ancestors(entry) {
            let Some(set) = select(&tree.node(id).rules) else {
                continue;
            };
            for (aspect, value) in set.iter() {
                cell.merge_constraint(aspect, value, axis);
            }
        }
    }
}
