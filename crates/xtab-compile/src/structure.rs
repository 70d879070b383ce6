#![deny(unsafe_code)]

//! Compiled axis trees.
//!
//! Each axis owns an arena of [`StructureNode`]s. Children are owned through
//! index lists; the `parent` index gives the upward path used for span
//! accumulation, ancestor-open marking and constraint resolution.

use serde::Serialize;
use xtab_model::{Aspect, Axis, NodeLabels, ParentChildOrder, QName, RuleSets};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What produced a structure node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    Breakdown {
        axis: Axis,
        parent_child_order: Option<ParentChildOrder>,
    },
    Rule,
    Aspect {
        aspect: Aspect,
    },
    /// A concept visited by a concept relationship walk.
    Concept {
        concept: QName,
    },
    /// A member enumerated by a dimension relationship node; `member` is
    /// `None` for the placeholder created when no DRS declares the dimension.
    DimensionMember {
        dimension: QName,
        member: Option<QName>,
    },
}

impl Origin {
    pub fn is_breakdown(&self) -> bool {
        matches!(self, Origin::Breakdown { .. })
    }

    pub fn is_aspect(&self) -> bool {
        matches!(self, Origin::Aspect { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StructureNode {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub origin: Origin,
    /// Definition node id, when the origin had one.
    pub definition_id: Option<String>,
    pub caption: Option<String>,
    pub labels: NodeLabels,
    pub level: usize,
    pub span: usize,
    /// Inserted by the depth balancer.
    pub is_fake: bool,
    pub is_abstract: bool,
    pub is_grayed: bool,
    /// Breakdowns only: an aspect node was found below.
    pub is_open: bool,
    pub merge: bool,
    pub rules: RuleSets,
    pub tag_selector: Option<String>,
    /// Header propagation copies point at the node they stand for.
    pub copy_of: Option<NodeId>,
}

impl StructureNode {
    pub fn new(origin: Origin) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            origin,
            definition_id: None,
            caption: None,
            labels: NodeLabels::default(),
            level: 0,
            span: 0,
            is_fake: false,
            is_abstract: false,
            is_grayed: false,
            is_open: false,
            merge: false,
            rules: RuleSets::default(),
            tag_selector: None,
            copy_of: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_breakdown(&self) -> bool {
        self.origin.is_breakdown()
    }

    pub fn is_copy(&self) -> bool {
        self.copy_of.is_some()
    }

    /// Structure-only copy of this node: same origin, labels and rules.
    pub(crate) fn clone_detached(&self) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            span: 0,
            copy_of: None,
            ..self.clone()
        }
    }
}

/// One axis of a compiled table.
#[derive(Debug, Clone, Serialize)]
pub struct AxisTree {
    pub axis: Axis,
    nodes: Vec<StructureNode>,
    roots: Vec<NodeId>,
    /// Arena length before header propagation copies were appended.
    structural_len: usize,
    pub is_open: bool,
}

impl AxisTree {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            nodes: Vec::new(),
            roots: Vec::new(),
            structural_len: 0,
            is_open: false,
        }
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &StructureNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut StructureNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Appends a detached node to the arena.
    pub fn push(&mut self, node: StructureNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn push_root(&mut self, mut node: StructureNode) -> NodeId {
        node.level = 0;
        let id = self.push(node);
        self.roots.push(id);
        id
    }

    /// Appends `node` as the last child of `parent`.
    pub fn push_child(&mut self, parent: NodeId, mut node: StructureNode) -> NodeId {
        node.parent = Some(parent);
        node.level = self.node(parent).level + 1;
        let id = self.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |&current| self.node(current).parent)
    }

    /// Depth-first pre-order walk of the structural tree.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.walk()
            .into_iter()
            .filter(|&id| self.node(id).is_leaf())
            .collect()
    }

    /// Deepest leaf level; 0 for an empty axis.
    pub fn depth(&self) -> usize {
        self.leaves()
            .into_iter()
            .map(|id| self.node(id).level)
            .max()
            .unwrap_or(0)
    }

    /// Height of the subtree below `id` (0 for a leaf).
    pub fn height(&self, id: NodeId) -> usize {
        self.node(id)
            .children
            .iter()
            .map(|&child| 1 + self.height(child))
            .max()
            .unwrap_or(0)
    }

    /// Number of balancer fakes in the structural tree.
    pub fn fake_count(&self) -> usize {
        self.walk()
            .into_iter()
            .filter(|&id| self.node(id).is_fake)
            .count()
    }

    pub(crate) fn retain_roots(&mut self, keep: impl Fn(&StructureNode) -> bool) {
        let nodes = &self.nodes;
        self.roots.retain(|id| keep(&nodes[id.0]));
    }

    pub(crate) fn relevel(&mut self, id: NodeId, level: usize) {
        let mut stack = vec![(id, level)];
        while let Some((current, level)) = stack.pop() {
            self.nodes[current.0].level = level;
            for &child in &self.nodes[current.0].children {
                stack.push((child, level + 1));
            }
        }
    }

    /// Fixes the structural arena; later appends are header copies.
    pub(crate) fn seal(&mut self) {
        self.structural_len = self.nodes.len();
    }

    /// Drops header copies and span counts from a previous header pass.
    pub(crate) fn reset_headers(&mut self) {
        if self.structural_len == 0 {
            self.structural_len = self.nodes.len();
        }
        self.nodes.truncate(self.structural_len);
        for node in &mut self.nodes {
            node.span = 0;
        }
    }
}

/// Per-axis structure of one table plus the table-level flags the compiler
/// discovered on the way.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledTable {
    pub id: String,
    pub label: Option<String>,
    pub code: Option<String>,
    pub default_order: ParentChildOrder,
    pub x: AxisTree,
    pub y: AxisTree,
    pub z: AxisTree,
    pub has_row_codes: bool,
    pub has_database_ids: bool,
}

impl CompiledTable {
    pub fn axis(&self, axis: Axis) -> &AxisTree {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    pub fn axis_mut(&mut self, axis: Axis) -> &mut AxisTree {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }

    pub fn open_axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL
            .into_iter()
            .filter(|&axis| self.axis(axis).is_open)
    }
}
