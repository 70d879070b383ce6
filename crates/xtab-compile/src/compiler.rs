#![deny(unsafe_code)]

//! Structure compiler: definition tree + taxonomy → per-axis structure trees.

use std::collections::BTreeSet;

use tracing::{debug, warn};
use xtab_model::{
    Aspect, AspectNode, Axis, Breakdown, ConceptRelationshipNode, ConstraintSet, DefinitionNode,
    DimensionRelationshipNode, MemberValue, NodeKind, QName, RelationshipSource, RuleNode,
    RuleSets, TableDefinition,
};
use xtab_taxonomy::{BaseSet, STANDARD_LINK_ROLE, TaxonomyIndex};

use crate::structure::{AxisTree, CompiledTable, NodeId, Origin, StructureNode};

/// Expands every breakdown of `table` into its axis tree.
///
/// Missing taxonomy data never fails the compile: the affected subtree is
/// dropped or reduced to a placeholder and a warning is logged.
pub fn compile(table: &TableDefinition, taxonomy: &TaxonomyIndex) -> CompiledTable {
    let mut compiler = Compiler {
        taxonomy,
        table: CompiledTable {
            id: table.id.clone(),
            label: table.label.clone(),
            code: table.code.clone(),
            default_order: table.parent_child_order,
            x: AxisTree::new(Axis::X),
            y: AxisTree::new(Axis::Y),
            z: AxisTree::new(Axis::Z),
            has_row_codes: false,
            has_database_ids: false,
        },
    };

    for def in table.sorted_breakdowns() {
        match &def.kind {
            NodeKind::Breakdown(breakdown) => compiler.compile_breakdown(def, breakdown),
            other => warn!(
                table = %table.id,
                kind = other.name(),
                "top-level table node is not a breakdown, skipping"
            ),
        }
    }

    compiler.table
}

struct Compiler<'a> {
    taxonomy: &'a TaxonomyIndex,
    table: CompiledTable,
}

impl Compiler<'_> {
    fn compile_breakdown(&mut self, def: &DefinitionNode, breakdown: &Breakdown) {
        let mut node = StructureNode::new(Origin::Breakdown {
            axis: breakdown.axis,
            parent_child_order: breakdown.parent_child_order,
        });
        node.definition_id = def.id.clone();
        node.caption = def.labels.text.clone();
        node.labels = def.labels.clone();
        node.is_abstract = true;
        node.is_grayed = true;

        let root = self.table.axis_mut(breakdown.axis).push_root(node);
        debug!(table = %self.table.id, axis = %breakdown.axis, "breakdown");
        self.compile_children(breakdown.axis, root, def);
    }

    fn compile_children(&mut self, axis: Axis, parent: NodeId, def: &DefinitionNode) {
        for child in def.sorted_children() {
            self.compile_node(axis, parent, child);
        }
    }

    fn compile_node(&mut self, axis: Axis, parent: NodeId, def: &DefinitionNode) {
        match &def.kind {
            NodeKind::Breakdown(breakdown) => self.compile_breakdown(def, breakdown),
            NodeKind::Rule(rule) => self.compile_rule(axis, parent, def, rule),
            NodeKind::Aspect(aspect) => self.compile_aspect(axis, parent, def, aspect),
            NodeKind::ConceptRelationship(cr) => {
                self.expand_concepts(axis, parent, cr);
                self.compile_children(axis, parent, def);
            }
            NodeKind::DimensionRelationship(dr) => {
                self.expand_dimension(axis, parent, dr);
                self.compile_children(axis, parent, def);
            }
        }
    }

    fn compile_rule(&mut self, axis: Axis, parent: NodeId, def: &DefinitionNode, rule: &RuleNode) {
        if def.labels.row_code.is_some() {
            self.table.has_row_codes = true;
        }
        if def.labels.database_id.is_some() {
            self.table.has_database_ids = true;
        }

        let mut node = StructureNode::new(Origin::Rule);
        node.definition_id = def.id.clone();
        node.caption = def.caption().map(str::to_string);
        node.labels = def.labels.clone();
        node.is_abstract = rule.is_abstract;
        node.is_grayed = rule.is_abstract;
        node.merge = rule.merge;
        node.rules = rule.rules.clone();
        node.tag_selector = rule.tag_selector.clone();

        let id = self.table.axis_mut(axis).push_child(parent, node);
        self.compile_children(axis, id, def);
    }

    fn compile_aspect(
        &mut self,
        axis: Axis,
        parent: NodeId,
        def: &DefinitionNode,
        aspect: &AspectNode,
    ) {
        let mut node = StructureNode::new(Origin::Aspect {
            aspect: aspect.aspect.clone(),
        });
        node.definition_id = def.id.clone();
        node.caption = Some(
            def.labels
                .text
                .clone()
                .unwrap_or_else(|| aspect.aspect.to_string()),
        );
        node.labels = def.labels.clone();
        node.is_grayed = true;
        node.rules = RuleSets::from_default(
            ConstraintSet::new().with(aspect.aspect.clone(), MemberValue::Open),
        );

        let tree = self.table.axis_mut(axis);
        let id = tree.push_child(parent, node);
        tree.is_open = true;
        let ancestors: Vec<NodeId> = tree.ancestors(id).collect();
        for ancestor in ancestors {
            let node = tree.node_mut(ancestor);
            if node.is_breakdown() {
                node.is_open = true;
            }
        }
        debug!(table = %self.table.id, %axis, aspect = %aspect.aspect, "open aspect");

        self.compile_children(axis, id, def);
    }

    fn expand_concepts(&mut self, axis: Axis, parent: NodeId, cr: &ConceptRelationshipNode) {
        let taxonomy = self.taxonomy;
        let link_role = cr.link_role.as_deref().unwrap_or(STANDARD_LINK_ROLE);
        let Some(base_set) = taxonomy
            .lookup_base_set(&cr.arc_kind, &cr.arc_role, link_role)
        else {
            warn!(
                table = %self.table.id,
                arc_kind = %cr.arc_kind,
                arc_role = %cr.arc_role,
                link_role,
                "base set not found, relationship node produces no rows"
            );
            return;
        };

        let mut sources: Vec<QName> = Vec::new();
        for source in &cr.sources {
            match source {
                RelationshipSource::Root => {
                    sources.extend(base_set.roots().into_iter().cloned());
                }
                RelationshipSource::Concept(qname) => {
                    if taxonomy.lookup_concept(qname).is_none() && !base_set.contains(qname) {
                        warn!(
                            table = %self.table.id,
                            source = %qname,
                            "unresolved relationship source, skipping"
                        );
                        continue;
                    }
                    sources.push(qname.clone());
                }
            }
        }

        let walk = ConceptWalk {
            base_set,
            limit: cr.formula_axis.effective_generations(cr.generations),
        };
        let use_self = cr.formula_axis.includes_self();
        for source in sources {
            let mut path = vec![source.clone()];
            let below = if use_self {
                self.push_concept(axis, parent, &source)
            } else {
                parent
            };
            self.walk_concepts(axis, below, &source, 1, &walk, &mut path);
        }
    }

    fn walk_concepts(
        &mut self,
        axis: Axis,
        parent: NodeId,
        concept: &QName,
        generation: u32,
        walk: &ConceptWalk<'_>,
        path: &mut Vec<QName>,
    ) {
        if walk.limit.is_some_and(|limit| generation > limit) {
            return;
        }
        for child in walk.base_set.children(concept) {
            if path.contains(child) {
                warn!(
                    table = %self.table.id,
                    concept = %child,
                    "relationship cycle, not descending again"
                );
                continue;
            }
            let id = self.push_concept(axis, parent, child);
            path.push(child.clone());
            self.walk_concepts(axis, id, child, generation + 1, walk, path);
            path.pop();
        }
    }

    fn push_concept(&mut self, axis: Axis, parent: NodeId, qname: &QName) -> NodeId {
        let concept = self.taxonomy.lookup_concept(qname);
        let mut node = StructureNode::new(Origin::Concept {
            concept: qname.clone(),
        });
        node.caption = Some(
            concept
                .map(|c| c.caption().to_string())
                .unwrap_or_else(|| qname.to_string()),
        );
        node.is_abstract = concept.is_some_and(|c| c.is_abstract);
        node.is_grayed = node.is_abstract;
        node.rules =
            RuleSets::from_default(ConstraintSet::new().with(Aspect::Concept, qname.clone()));
        self.table.axis_mut(axis).push_child(parent, node)
    }

    fn expand_dimension(&mut self, axis: Axis, parent: NodeId, dr: &DimensionRelationshipNode) {
        let taxonomy = self.taxonomy;
        let dimension = Aspect::Dimension(dr.dimension.clone());
        let Some(drs_dimension) = taxonomy
            .lookup_dimension(dr.link_role.as_deref(), &dr.dimension)
        else {
            warn!(
                table = %self.table.id,
                dimension = %dr.dimension,
                link_role = dr.link_role.as_deref().unwrap_or("*"),
                "no DRS declares the dimension, using a placeholder"
            );
            self.push_dimension_placeholder(axis, parent, dr);
            return;
        };
        if drs_dimension.members.is_empty() {
            warn!(
                table = %self.table.id,
                dimension = %dr.dimension,
                "dimension has no enumerated members, using a placeholder"
            );
            self.push_dimension_placeholder(axis, parent, dr);
            return;
        }

        let mut seen: BTreeSet<&QName> = BTreeSet::new();
        for member in &drs_dimension.members {
            if !seen.insert(member) {
                continue;
            }
            let mut node = StructureNode::new(Origin::DimensionMember {
                dimension: dr.dimension.clone(),
                member: Some(member.clone()),
            });
            node.caption = Some(
                taxonomy
                    .lookup_concept(member)
                    .map(|c| c.caption().to_string())
                    .unwrap_or_else(|| member.to_string()),
            );
            node.rules = RuleSets::from_default(
                ConstraintSet::new().with(dimension.clone(), member.clone()),
            );
            self.table.axis_mut(axis).push_child(parent, node);
        }
        debug!(
            table = %self.table.id,
            dimension = %dr.dimension,
            members = seen.len(),
            "dimension relationship expanded"
        );
    }

    fn push_dimension_placeholder(&mut self, axis: Axis, parent: NodeId, dr: &DimensionRelationshipNode) {
        let mut node = StructureNode::new(Origin::DimensionMember {
            dimension: dr.dimension.clone(),
            member: None,
        });
        node.caption = Some(dr.dimension.to_string());
        self.table.axis_mut(axis).push_child(parent, node);
    }
}

struct ConceptWalk<'a> {
    base_set: &'a BaseSet,
    limit: Option<u32>,
}
