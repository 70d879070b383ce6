#![deny(unsafe_code)]

//! Base sets: concept hierarchies selected by arc kind, arc role and link role.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use xtab_model::QName;

/// Link role of relationships not placed in an extended link role.
pub const STANDARD_LINK_ROLE: &str = "http://www.xbrl.org/2003/role/link";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BaseSetKey {
    pub arc_kind: String,
    pub arc_role: String,
    pub link_role: String,
}

impl BaseSetKey {
    pub fn new(
        arc_kind: impl Into<String>,
        arc_role: impl Into<String>,
        link_role: impl Into<String>,
    ) -> Self {
        Self {
            arc_kind: arc_kind.into(),
            arc_role: arc_role.into(),
            link_role: link_role.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: QName,
    pub to: QName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

impl Relationship {
    pub fn new(from: QName, to: QName, order: Option<f64>) -> Self {
        Self { from, to, order }
    }

    /// Arc order; absent orders count as 0.
    pub fn effective_order(&self) -> f64 {
        self.order.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseSet {
    #[serde(flatten)]
    pub key: BaseSetKey,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl BaseSet {
    pub fn new(key: BaseSetKey) -> Self {
        Self {
            key,
            relationships: Vec::new(),
        }
    }

    pub fn with_arc(mut self, from: QName, to: QName, order: Option<f64>) -> Self {
        self.relationships.push(Relationship::new(from, to, order));
        self
    }

    /// Concepts that are a source of some arc but the target of none, in
    /// first-appearance order.
    pub fn roots(&self) -> Vec<&QName> {
        let mut roots: Vec<&QName> = Vec::new();
        for rel in &self.relationships {
            let targeted = self.relationships.iter().any(|other| other.to == rel.from);
            if !targeted && !roots.contains(&&rel.from) {
                roots.push(&rel.from);
            }
        }
        roots
    }

    /// Targets of `parent`, ascending by arc order; equal orders keep
    /// document order.
    pub fn children(&self, parent: &QName) -> Vec<&QName> {
        let mut arcs: Vec<&Relationship> = self
            .relationships
            .iter()
            .filter(|rel| &rel.from == parent)
            .collect();
        arcs.sort_by(|a, b| {
            a.effective_order()
                .partial_cmp(&b.effective_order())
                .unwrap_or(Ordering::Equal)
        });
        arcs.into_iter().map(|rel| &rel.to).collect()
    }

    pub fn contains(&self, qname: &QName) -> bool {
        self.relationships
            .iter()
            .any(|rel| &rel.from == qname || &rel.to == qname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qn(value: &str) -> QName {
        QName::new(value).unwrap()
    }

    #[test]
    fn children_follow_arc_order_with_missing_as_zero() {
        let set = BaseSet::new(BaseSetKey::new("presentationArc", "pc", "r"))
            .with_arc(qn("m:R"), qn("m:C"), Some(2.0))
            .with_arc(qn("m:R"), qn("m:A"), None)
            .with_arc(qn("m:R"), qn("m:B"), Some(1.5));
        let children: Vec<_> = set.children(&qn("m:R")).into_iter().map(QName::as_str).collect();
        assert_eq!(children, vec!["m:A", "m:B", "m:C"]);
    }

    #[test]
    fn roots_are_untargeted_sources() {
        let set = BaseSet::new(BaseSetKey::new("presentationArc", "pc", "r"))
            .with_arc(qn("m:R"), qn("m:A"), None)
            .with_arc(qn("m:A"), qn("m:B"), None)
            .with_arc(qn("m:S"), qn("m:C"), None);
        let roots: Vec<_> = set.roots().into_iter().map(QName::as_str).collect();
        assert_eq!(roots, vec!["m:R", "m:S"]);
    }
}
