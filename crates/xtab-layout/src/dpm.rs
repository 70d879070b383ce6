#![deny(unsafe_code)]

//! DPM address map: one entry per fact cell, keyed by its address.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::warn;
use xtab_model::{Aspect, Cell, Layout, QName};
use xtab_taxonomy::{PeriodType, TaxonomyIndex};

/// Slot value of an aspect the cell does not constrain.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DpmEntry {
    pub concept: Option<QName>,
    pub data_type: Option<String>,
    pub period_type: Option<PeriodType>,
    /// One slot per non-concept aspect seen anywhere in the table.
    pub dimensions: BTreeMap<String, String>,
    pub is_grayed: bool,
    pub open_dimensions: Vec<String>,
    /// Typed dimension → domain element reference.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub typed_domains: BTreeMap<String, String>,
}

pub type DpmMap = BTreeMap<String, DpmEntry>;

/// Flattens every fact cell of `layout` into the address map.
pub fn export(layout: &Layout, taxonomy: &TaxonomyIndex) -> DpmMap {
    let slots: BTreeSet<&Aspect> = layout
        .fact_cells()
        .flat_map(|cell| cell.constraints.keys())
        .filter(|aspect| !aspect.is_concept())
        .collect();

    let mut map = DpmMap::new();
    for cell in layout.fact_cells() {
        let Some(address) = &cell.address else {
            continue;
        };
        let key = address.key();
        if map.contains_key(&key) {
            warn!(table = %layout.table_id, address = %key, "duplicate fact address, keeping the last");
        }
        map.insert(key, entry(cell, &slots, taxonomy));
    }
    map
}

fn entry(cell: &Cell, slots: &BTreeSet<&Aspect>, taxonomy: &TaxonomyIndex) -> DpmEntry {
    let concept = cell.concept().cloned();
    let definition = concept.as_ref().and_then(|qname| taxonomy.lookup_concept(qname));

    let dimensions = slots
        .iter()
        .map(|&aspect| {
            let value = cell
                .constraint(aspect)
                .map(|c| c.value.to_string())
                .unwrap_or_else(|| WILDCARD.to_string());
            (aspect.to_string(), value)
        })
        .collect();

    let open_dimensions = cell
        .constraints
        .values()
        .filter(|c| c.value.is_open())
        .map(|c| c.aspect.to_string())
        .collect();

    let typed_domains = cell
        .constraints
        .keys()
        .filter_map(Aspect::dimension)
        .filter_map(|dim| {
            let domain = taxonomy.lookup_concept(dim)?.typed_domain_ref.clone()?;
            Some((dim.to_string(), domain))
        })
        .collect();

    DpmEntry {
        concept,
        data_type: definition.and_then(|c| c.data_type.clone()),
        period_type: definition.and_then(|c| c.period_type),
        dimensions,
        is_grayed: cell.is_grayed,
        open_dimensions,
        typed_domains,
    }
}
