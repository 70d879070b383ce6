#![deny(unsafe_code)]

//! Dimensional relationship sets.

use serde::{Deserialize, Serialize};
use xtab_model::QName;

/// Whether a DRS lists allowed ("all") or excluded ("notAll") combinations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HypercubeArcRole {
    #[default]
    All,
    NotAll,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrsDimension {
    pub qname: QName,
    /// Enumerated members; empty for typed dimensions.
    #[serde(default)]
    pub members: Vec<QName>,
}

impl DrsDimension {
    pub fn new(qname: QName, members: impl IntoIterator<Item = QName>) -> Self {
        Self {
            qname,
            members: members.into_iter().collect(),
        }
    }

    pub fn allows(&self, member: &QName) -> bool {
        self.members.contains(member)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hypercube {
    pub qname: QName,
    #[serde(default)]
    pub dimensions: Vec<DrsDimension>,
}

impl Hypercube {
    pub fn new(qname: QName, dimensions: Vec<DrsDimension>) -> Self {
        Self { qname, dimensions }
    }
}

/// One DRS: the primary items of a link role with their hypercubes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drs {
    /// Link role of the base set the DRS originates from.
    pub role: String,
    #[serde(default)]
    pub arc_role: HypercubeArcRole,
    pub primary_items: Vec<QName>,
    #[serde(default)]
    pub hypercubes: Vec<Hypercube>,
}

impl Drs {
    pub fn new(role: impl Into<String>, primary_items: Vec<QName>) -> Self {
        Self {
            role: role.into(),
            arc_role: HypercubeArcRole::All,
            primary_items,
            hypercubes: Vec::new(),
        }
    }

    pub fn with_arc_role(mut self, arc_role: HypercubeArcRole) -> Self {
        self.arc_role = arc_role;
        self
    }

    pub fn with_hypercube(mut self, hypercube: Hypercube) -> Self {
        self.hypercubes.push(hypercube);
        self
    }

    pub fn is_all(&self) -> bool {
        self.arc_role == HypercubeArcRole::All
    }

    pub fn has_primary_item(&self, concept: &QName) -> bool {
        self.primary_items.contains(concept)
    }

    /// Every dimension across all hypercubes.
    pub fn dimensions(&self) -> impl Iterator<Item = &DrsDimension> {
        self.hypercubes.iter().flat_map(|cube| cube.dimensions.iter())
    }

    pub fn dimension(&self, qname: &QName) -> Option<&DrsDimension> {
        self.dimensions().find(|dim| &dim.qname == qname)
    }
}
