#![deny(unsafe_code)]

//! Header builder.
//!
//! Turns a balanced axis tree into header rows: `levels[l - 1]` holds the
//! entries of header level `l` for `l` in `1..=depth`, left to right (top to
//! bottom on the row axis). Every deepest-level entry is one rendered column
//! or row; each entry's span is the number of deepest entries below it.

use serde::Serialize;
use tracing::{debug, info};
use xtab_model::{Axis, ParentChildOrder, TableError};

use crate::structure::{AxisTree, CompiledTable, NodeId, Origin};

/// Options for one rendering pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    /// Overrides every breakdown's and the table's parent-child order.
    pub order_override: Option<ParentChildOrder>,
}

impl RenderOptions {
    pub fn with_order(order: ParentChildOrder) -> Self {
        Self {
            order_override: Some(order),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderEntry {
    pub node: NodeId,
    /// False for breakdown spacers: they keep the grid rectangular but show
    /// no caption.
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub axis: Axis,
    levels: Vec<Vec<HeaderEntry>>,
}

impl Header {
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Entries of header level `level` (1-based).
    pub fn level(&self, level: usize) -> &[HeaderEntry] {
        level
            .checked_sub(1)
            .and_then(|idx| self.levels.get(idx))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `(level, entries)` from the top level down.
    pub fn levels(&self) -> impl Iterator<Item = (usize, &[HeaderEntry])> {
        self.levels
            .iter()
            .enumerate()
            .map(|(idx, entries)| (idx + 1, entries.as_slice()))
    }

    /// One entry per rendered column/row.
    pub fn deepest(&self) -> &[HeaderEntry] {
        self.level(self.depth())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Headers {
    pub x: Header,
    pub y: Header,
    pub z: Header,
}

impl Headers {
    pub fn axis(&self, axis: Axis) -> &Header {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Builds the headers of all three axes.
///
/// Fails only when no axis produced a header level. Running it again on the
/// same table discards the copies and spans of the previous pass.
pub fn build_headers(
    table: &mut CompiledTable,
    options: &RenderOptions,
) -> Result<Headers, TableError> {
    let default_order = table.default_order;
    let x = build_axis_header(&mut table.x, default_order, options);
    let y = build_axis_header(&mut table.y, default_order, options);
    let z = build_axis_header(&mut table.z, default_order, options);

    if x.is_empty() && y.is_empty() && z.is_empty() {
        return Err(TableError::invalid_definition(
            &table.id,
            "no axis produced any header",
        ));
    }
    for header in [&x, &y, &z] {
        if header.is_empty() {
            debug!(table = %table.id, axis = %header.axis, "axis has no header, using a placeholder");
        }
    }
    info!(
        table = %table.id,
        columns = x.deepest().len(),
        rows = y.deepest().len(),
        sheets = z.deepest().len(),
        "headers built"
    );

    Ok(Headers { x, y, z })
}

pub fn build_axis_header(
    tree: &mut AxisTree,
    default_order: ParentChildOrder,
    options: &RenderOptions,
) -> Header {
    tree.reset_headers();
    let depth = tree.depth();
    let mut builder = HeaderBuilder {
        tree,
        depth,
        levels: vec![Vec::new(); depth],
    };

    if depth > 0 {
        let roots = builder.tree.roots().to_vec();
        for root in roots {
            let breakdown_order = match &builder.tree.node(root).origin {
                Origin::Breakdown {
                    parent_child_order, ..
                } => *parent_child_order,
                _ => None,
            };
            let order = options
                .order_override
                .or(breakdown_order)
                .unwrap_or(default_order);
            builder.place(root, order);
        }
        builder.accumulate_spans();
    }

    Header {
        axis: builder.tree.axis,
        levels: builder.levels,
    }
}

struct HeaderBuilder<'a> {
    tree: &'a mut AxisTree,
    depth: usize,
    levels: Vec<Vec<HeaderEntry>>,
}

impl HeaderBuilder<'_> {
    fn place(&mut self, id: NodeId, order: ParentChildOrder) {
        let children = self.tree.node(id).children.clone();
        match order {
            ParentChildOrder::ParentFirst => {
                self.emit(id);
                self.propagate(id);
                for child in children {
                    self.place(child, order);
                }
            }
            ParentChildOrder::ChildrenFirst => {
                for child in children {
                    self.place(child, order);
                }
                self.emit(id);
                self.propagate(id);
            }
        }
    }

    fn emit(&mut self, id: NodeId) {
        let node = self.tree.node(id);
        if node.level == 0 {
            return;
        }
        let visible = !node.is_breakdown();
        self.levels[node.level - 1].push(HeaderEntry { node: id, visible });
    }

    /// Gives a node that owns a column/row of its own a chain of copies down
    /// to the deepest level.
    fn propagate(&mut self, id: NodeId) {
        let node = self.tree.node(id);
        if node.is_fake || node.level >= self.depth {
            return;
        }
        let row_axis = self.tree.axis == Axis::Y;
        let owns_line =
            !node.is_abstract || (row_axis && (!node.is_breakdown() || node.is_open));
        if !owns_line {
            return;
        }

        let start = node.level + 1;
        let mut template = node.clone_detached();
        let visible = !template.is_breakdown();
        if template.is_breakdown() {
            // The own row of an open breakdown carries the open aspect values.
            template.is_abstract = false;
            template.is_grayed = false;
        }
        let mut parent = id;
        for level in start..=self.depth {
            let mut copy = template.clone();
            copy.parent = Some(parent);
            copy.level = level;
            copy.copy_of = Some(id);
            let copy_id = self.tree.push(copy);
            self.levels[level - 1].push(HeaderEntry {
                node: copy_id,
                visible,
            });
            parent = copy_id;
        }
    }

    fn accumulate_spans(&mut self) {
        let Some(deepest) = self.levels.last() else {
            return;
        };
        for entry in deepest {
            let chain: Vec<NodeId> = self.tree.ancestors(entry.node).collect();
            for id in chain {
                self.tree.node_mut(id).span += 1;
            }
        }
    }
}
