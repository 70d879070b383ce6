//! Table definition resources - the input of the compiler.
//!
//! A table is a forest of breakdowns, each the root of a tree of typed
//! definition nodes. The loader that produces these from linkbase markup
//! lives outside this workspace; here the tree is plain serde data.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Aspect, Axis, ParentChildOrder, QName, RelationshipAxis, RuleSets, TableError};

/// Standard parent-child arcrole used by presentation base sets.
pub const PARENT_CHILD_ARCROLE: &str = "http://www.xbrl.org/2003/arcrole/parent-child";
/// Arc element name of presentation relationships.
pub const PRESENTATION_ARC: &str = "presentationArc";
/// Relationship source sentinel standing for the roots of the base set.
pub const ROOT_SOURCE: &str = "xfi:root";

const ORDER_KEY_WIDTH: usize = 12;

/// Display labels attached to a definition node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLabels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Row/column code label (e.g. "0010").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_code: Option<String>,
    /// Database identifier label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Ordering key among siblings; compared through [`order_key`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default)]
    pub labels: NodeLabels,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DefinitionNode>,
}

/// The five definition node kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Breakdown(Breakdown),
    Rule(RuleNode),
    Aspect(AspectNode),
    ConceptRelationship(ConceptRelationshipNode),
    DimensionRelationship(DimensionRelationshipNode),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Breakdown(_) => "breakdown",
            NodeKind::Rule(_) => "rule",
            NodeKind::Aspect(_) => "aspect",
            NodeKind::ConceptRelationship(_) => "concept_relationship",
            NodeKind::DimensionRelationship(_) => "dimension_relationship",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub axis: Axis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_child_order: Option<ParentChildOrder>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleNode {
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub merge: bool,
    #[serde(default)]
    pub rules: RuleSets,
    /// Selects the tagged rule set applied to every cell this node touches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_selector: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectNode {
    pub aspect: Aspect,
}

/// Where a concept relationship walk starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RelationshipSource {
    /// The roots of the selected base set.
    Root,
    Concept(QName),
}

impl TryFrom<String> for RelationshipSource {
    type Error = TableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim() == ROOT_SOURCE {
            return Ok(RelationshipSource::Root);
        }
        QName::new(value).map(RelationshipSource::Concept)
    }
}

impl From<RelationshipSource> for String {
    fn from(value: RelationshipSource) -> Self {
        match value {
            RelationshipSource::Root => ROOT_SOURCE.to_string(),
            RelationshipSource::Concept(qname) => qname.into(),
        }
    }
}

impl fmt::Display for RelationshipSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipSource::Root => f.write_str(ROOT_SOURCE),
            RelationshipSource::Concept(qname) => write!(f, "{qname}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptRelationshipNode {
    pub sources: Vec<RelationshipSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_role: Option<String>,
    #[serde(default = "default_arc_role")]
    pub arc_role: String,
    #[serde(default = "default_arc_kind")]
    pub arc_kind: String,
    #[serde(default = "default_formula_axis")]
    pub formula_axis: RelationshipAxis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generations: Option<u32>,
}

fn default_arc_role() -> String {
    PARENT_CHILD_ARCROLE.to_string()
}

fn default_arc_kind() -> String {
    PRESENTATION_ARC.to_string()
}

fn default_formula_axis() -> RelationshipAxis {
    RelationshipAxis::DescendantOrSelf
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRelationshipNode {
    pub dimension: QName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_role: Option<String>,
}

impl DefinitionNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: None,
            order: None,
            labels: NodeLabels::default(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn breakdown(axis: Axis) -> Self {
        Self::new(NodeKind::Breakdown(Breakdown {
            axis,
            parent_child_order: None,
        }))
    }

    pub fn rule(rules: RuleSets) -> Self {
        Self::new(NodeKind::Rule(RuleNode {
            rules,
            ..RuleNode::default()
        }))
    }

    pub fn aspect(aspect: Aspect) -> Self {
        Self::new(NodeKind::Aspect(AspectNode { aspect }))
    }

    pub fn concept_relationship(
        sources: Vec<RelationshipSource>,
        link_role: Option<&str>,
        formula_axis: RelationshipAxis,
        generations: Option<u32>,
    ) -> Self {
        Self::new(NodeKind::ConceptRelationship(ConceptRelationshipNode {
            sources,
            link_role: link_role.map(str::to_string),
            arc_role: default_arc_role(),
            arc_kind: default_arc_kind(),
            formula_axis,
            generations,
        }))
    }

    pub fn dimension_relationship(dimension: QName, link_role: Option<&str>) -> Self {
        Self::new(NodeKind::DimensionRelationship(DimensionRelationshipNode {
            dimension,
            link_role: link_role.map(str::to_string),
        }))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn with_label(mut self, text: impl Into<String>) -> Self {
        self.labels.text = Some(text.into());
        self
    }

    pub fn with_row_code(mut self, code: impl Into<String>) -> Self {
        self.labels.row_code = Some(code.into());
        self
    }

    pub fn with_database_id(mut self, id: impl Into<String>) -> Self {
        self.labels.database_id = Some(id.into());
        self
    }

    pub fn with_child(mut self, child: DefinitionNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DefinitionNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Mutable access to the rule payload; no-op for other kinds.
    pub fn map_rule(mut self, f: impl FnOnce(&mut RuleNode)) -> Self {
        if let NodeKind::Rule(rule) = &mut self.kind {
            f(rule);
        }
        self
    }

    /// Sets the parent-child order of a breakdown; no-op for other kinds.
    pub fn with_parent_child_order(mut self, order: ParentChildOrder) -> Self {
        if let NodeKind::Breakdown(breakdown) = &mut self.kind {
            breakdown.parent_child_order = Some(order);
        }
        self
    }

    /// Children in ascending ordering key, document order on ties.
    pub fn sorted_children(&self) -> Vec<&DefinitionNode> {
        sort_by_order(&self.children)
    }

    /// Display caption: the text label, falling back to the id.
    pub fn caption(&self) -> Option<&str> {
        self.labels.text.as_deref().or(self.id.as_deref())
    }
}

/// A table resource: the breakdowns plus table-level rendering defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Row/column identification code of the table (e.g. "C 01.00").
    /// Cells are validated against the taxonomy only when this is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub parent_child_order: ParentChildOrder,
    #[serde(default)]
    pub breakdowns: Vec<DefinitionNode>,
}

impl TableDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            code: None,
            parent_child_order: ParentChildOrder::default(),
            breakdowns: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_breakdown(mut self, breakdown: DefinitionNode) -> Self {
        self.breakdowns.push(breakdown);
        self
    }

    pub fn sorted_breakdowns(&self) -> Vec<&DefinitionNode> {
        sort_by_order(&self.breakdowns)
    }
}

/// Fixed-width sort key for an ordering attribute.
///
/// The integer part is zero-padded so that lexical and numeric order agree;
/// a missing key sorts first. Negative keys sort before non-negative ones,
/// with their digits complemented so larger magnitudes come first.
pub fn order_key(order: Option<&str>) -> String {
    let raw = order.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return String::new();
    }
    let (negative, magnitude) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (integer, fraction) = magnitude.split_once('.').unwrap_or((magnitude, ""));
    let integer = format!("{integer:0>width$}", width = ORDER_KEY_WIDTH);

    if !negative {
        let mut key = integer;
        if !fraction.is_empty() {
            key.push('.');
            key.push_str(fraction);
        }
        return key;
    }

    // `~` ends the fraction above every digit, so -1 sorts after -1.5.
    let mut key = String::from("-");
    key.extend(integer.chars().map(complement_digit));
    key.push('.');
    key.extend(fraction.chars().map(complement_digit));
    key.push('~');
    key
}

fn complement_digit(c: char) -> char {
    c.to_digit(10)
        .and_then(|digit| char::from_digit(9 - digit, 10))
        .unwrap_or(c)
}

fn sort_by_order(nodes: &[DefinitionNode]) -> Vec<&DefinitionNode> {
    let mut sorted: Vec<&DefinitionNode> = nodes.iter().collect();
    sorted.sort_by_cached_key(|node| order_key(node.order.as_deref()));
    sorted
}
