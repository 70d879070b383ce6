#![deny(unsafe_code)]

//! Depth balancer.
//!
//! Pads every axis so that all root-to-leaf paths have the same length. A
//! short child subtree is pushed down by inserting a chain of fake clones of
//! its parent; consecutive siblings short by the same amount share a chain.

use tracing::{debug, warn};

use crate::structure::{AxisTree, CompiledTable, NodeId};

pub fn balance(table: &mut CompiledTable) {
    let CompiledTable { id, x, y, z, .. } = table;
    for tree in [x, y, z] {
        balance_axis(id.as_str(), tree);
    }
}

pub fn balance_axis(table_id: &str, tree: &mut AxisTree) {
    let before = tree.roots().len();
    tree.retain_roots(|node| !(node.is_breakdown() && node.is_leaf()));
    if tree.roots().len() < before {
        warn!(
            table = table_id,
            axis = %tree.axis,
            pruned = before - tree.roots().len(),
            "empty breakdowns pruned"
        );
    }

    let target = tree.depth();
    let roots = tree.roots().to_vec();
    for root in roots {
        pad(tree, root, target);
    }
    tree.seal();

    debug!(
        table = table_id,
        axis = %tree.axis,
        depth = target,
        fakes = tree.fake_count(),
        "axis balanced"
    );
}

fn pad(tree: &mut AxisTree, id: NodeId, target: usize) {
    let children = tree.node(id).children.clone();
    if children.is_empty() {
        return;
    }
    let level = tree.node(id).level;
    let deficit = |tree: &AxisTree, child: NodeId| {
        target.saturating_sub(level + 1 + tree.height(child))
    };

    let mut new_children = Vec::with_capacity(children.len());
    let mut start = 0;
    while start < children.len() {
        let missing = deficit(tree, children[start]);
        let mut end = start + 1;
        while end < children.len() && deficit(tree, children[end]) == missing {
            end += 1;
        }
        let run = &children[start..end];
        if missing == 0 {
            new_children.extend_from_slice(run);
        } else {
            new_children.push(insert_fake_chain(tree, id, run, missing));
        }
        start = end;
    }

    tree.node_mut(id).children = new_children;
    tree.relevel(id, level);

    for child in children {
        pad(tree, child, target);
    }
}

/// Links `length` fakes of `source` below it and re-parents `run` to the
/// last one. Returns the first fake.
fn insert_fake_chain(tree: &mut AxisTree, source: NodeId, run: &[NodeId], length: usize) -> NodeId {
    let mut template = tree.node(source).clone_detached();
    template.is_fake = true;
    template.is_abstract = true;
    template.is_grayed = true;
    template.definition_id = None;

    let mut first = None;
    let mut parent = source;
    for _ in 0..length {
        let mut fake = template.clone();
        fake.parent = Some(parent);
        let fake_id = tree.push(fake);
        if parent != source {
            tree.node_mut(parent).children.push(fake_id);
        }
        first.get_or_insert(fake_id);
        parent = fake_id;
    }

    for &child in run {
        tree.node_mut(child).parent = Some(parent);
        tree.node_mut(parent).children.push(child);
    }
    first.unwrap_or(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{Origin, StructureNode};
    use xtab_model::Axis;

    fn chain(tree: &mut AxisTree, parent: NodeId, length: usize) {
        let mut current = parent;
        for _ in 0..length {
            current = tree.push_child(current, StructureNode::new(Origin::Rule));
        }
    }

    #[test]
    fn siblings_short_by_the_same_amount_share_one_chain() {
        let mut tree = AxisTree::new(Axis::X);
        let root = tree.push_root(StructureNode::new(Origin::Rule));
        chain(&mut tree, root, 3);
        tree.push_child(root, StructureNode::new(Origin::Rule));
        tree.push_child(root, StructureNode::new(Origin::Rule));

        balance_axis("t", &mut tree);

        assert_eq!(tree.fake_count(), 2);
        let levels: Vec<usize> = tree.leaves().iter().map(|&id| tree.node(id).level).collect();
        assert_eq!(levels, vec![3, 3, 3]);
    }

    #[test]
    fn childless_breakdowns_are_pruned() {
        let mut tree = AxisTree::new(Axis::Y);
        tree.push_root(StructureNode::new(Origin::Breakdown {
            axis: Axis::Y,
            parent_child_order: None,
        }));
        balance_axis("t", &mut tree);
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
    }
}
