#![deny(unsafe_code)]

//! Read-only lookup structure consumed by the compiler and the validator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use xtab_model::QName;

use crate::base_set::{BaseSet, BaseSetKey};
use crate::concept::Concept;
use crate::drs::{Drs, DrsDimension};

/// Serialized form of a taxonomy index, as stored in a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub concepts: Vec<Concept>,
    #[serde(default)]
    pub base_sets: Vec<BaseSet>,
    #[serde(default)]
    pub drs: Vec<Drs>,
    /// Dimension → default member.
    #[serde(default)]
    pub default_members: BTreeMap<QName, QName>,
}

impl TaxonomyDocument {
    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.concepts.push(concept);
        self
    }

    pub fn with_base_set(mut self, base_set: BaseSet) -> Self {
        self.base_sets.push(base_set);
        self
    }

    pub fn with_drs(mut self, drs: Drs) -> Self {
        self.drs.push(drs);
        self
    }

    pub fn with_default_member(mut self, dimension: QName, member: QName) -> Self {
        self.default_members.insert(dimension, member);
        self
    }

    pub fn build(self) -> TaxonomyIndex {
        TaxonomyIndex::from(self)
    }
}

/// Concepts by QName, base sets by key, DRS by primary item.
///
/// Immutable once built; share it between threads by reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaxonomyDocument", into = "TaxonomyDocument")]
pub struct TaxonomyIndex {
    name: Option<String>,
    concepts: BTreeMap<QName, Concept>,
    base_sets: BTreeMap<BaseSetKey, BaseSet>,
    drs: Vec<Drs>,
    drs_by_primary_item: BTreeMap<QName, Vec<usize>>,
    default_members: BTreeMap<QName, QName>,
}

impl From<TaxonomyDocument> for TaxonomyIndex {
    fn from(doc: TaxonomyDocument) -> Self {
        let mut concepts = BTreeMap::new();
        for concept in doc.concepts {
            if let Some(previous) = concepts.insert(concept.qname.clone(), concept) {
                warn!(concept = %previous.qname, "duplicate concept definition, keeping the last");
            }
        }

        let mut base_sets: BTreeMap<BaseSetKey, BaseSet> = BTreeMap::new();
        for base_set in doc.base_sets {
            match base_sets.get_mut(&base_set.key) {
                Some(existing) => existing.relationships.extend(base_set.relationships),
                None => {
                    base_sets.insert(base_set.key.clone(), base_set);
                }
            }
        }

        let mut drs_by_primary_item: BTreeMap<QName, Vec<usize>> = BTreeMap::new();
        for (idx, drs) in doc.drs.iter().enumerate() {
            for item in &drs.primary_items {
                drs_by_primary_item.entry(item.clone()).or_default().push(idx);
            }
        }

        Self {
            name: doc.name,
            concepts,
            base_sets,
            drs: doc.drs,
            drs_by_primary_item,
            default_members: doc.default_members,
        }
    }
}

impl From<TaxonomyIndex> for TaxonomyDocument {
    fn from(index: TaxonomyIndex) -> Self {
        Self {
            name: index.name,
            concepts: index.concepts.into_values().collect(),
            base_sets: index.base_sets.into_values().collect(),
            drs: index.drs,
            default_members: index.default_members,
        }
    }
}

impl TaxonomyIndex {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    pub fn base_set_count(&self) -> usize {
        self.base_sets.len()
    }

    pub fn drs_count(&self) -> usize {
        self.drs.len()
    }

    pub fn lookup_concept(&self, qname: &QName) -> Option<&Concept> {
        self.concepts.get(qname)
    }

    pub fn lookup_base_set(
        &self,
        arc_kind: &str,
        arc_role: &str,
        link_role: &str,
    ) -> Option<&BaseSet> {
        self.base_sets
            .get(&BaseSetKey::new(arc_kind, arc_role, link_role))
    }

    /// "all"-type DRS whose originating role is `link_role` (any role when
    /// `None`), in declaration order.
    pub fn lookup_drs<'a, 'r>(
        &'a self,
        link_role: Option<&'r str>,
    ) -> impl Iterator<Item = &'a Drs> + use<'a, 'r> {
        self.drs
            .iter()
            .filter(move |drs| drs.is_all() && link_role.is_none_or(|role| drs.role == role))
    }

    /// The first "all"-type DRS of `link_role` declaring `dimension`.
    pub fn lookup_dimension(
        &self,
        link_role: Option<&str>,
        dimension: &QName,
    ) -> Option<&DrsDimension> {
        self.lookup_drs(link_role)
            .find_map(|drs| drs.dimension(dimension))
    }

    pub fn default_member(&self, dimension: &QName) -> Option<&QName> {
        self.default_members.get(dimension)
    }

    /// "all"-type DRS listing `concept` as a primary item.
    pub fn primary_item_drs(&self, concept: &QName) -> Vec<&Drs> {
        self.drs_by_primary_item
            .get(concept)
            .into_iter()
            .flatten()
            .filter_map(|&idx| self.drs.get(idx))
            .filter(|drs| drs.is_all())
            .collect()
    }
}
