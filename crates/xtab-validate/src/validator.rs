#![deny(unsafe_code)]

//! Dimensional validation of resolved fact cells.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::trace;
use xtab_compile::CompiledTable;
use xtab_model::{Aspect, Axis, Cell, MemberValue};
use xtab_taxonomy::{Drs, DrsDimension, TaxonomyIndex};

use crate::resolve::{CellNodes, resolve};

/// Outcome of validating one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Valid,
    /// The table declares no code; nothing to check against.
    Unchecked,
    MissingConcept,
    UnknownConcept,
    NoPrimaryItemDrs,
    NoMatchingRole,
    UnsatisfiedDimensions,
}

impl Verdict {
    pub fn is_valid(self) -> bool {
        matches!(self, Verdict::Valid | Verdict::Unchecked)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Valid => "valid",
            Verdict::Unchecked => "unchecked",
            Verdict::MissingConcept => "missing concept",
            Verdict::UnknownConcept => "unknown concept",
            Verdict::NoPrimaryItemDrs => "concept is not a primary item",
            Verdict::NoMatchingRole => "no DRS for the table code",
            Verdict::UnsatisfiedDimensions => "dimensions not satisfied",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks a resolved cell against the DRS of its concept.
///
/// Only tables with a code are checked. A cell is valid when its concept is
/// known, is a primary item of a DRS whose role matches the code, and every
/// hypercube dimension of one such DRS is consumed by the cell.
pub fn validate(cell: &Cell, table_code: Option<&str>, taxonomy: &TaxonomyIndex) -> Verdict {
    let Some(code) = table_code else {
        return Verdict::Unchecked;
    };
    let Some(concept) = cell.concept() else {
        return Verdict::MissingConcept;
    };
    if taxonomy.lookup_concept(concept).is_none() {
        return Verdict::UnknownConcept;
    }

    let candidates = taxonomy.primary_item_drs(concept);
    if candidates.is_empty() {
        return Verdict::NoPrimaryItemDrs;
    }
    let matching: Vec<&Drs> = candidates
        .into_iter()
        .filter(|drs| role_matches_code(&drs.role, code))
        .collect();
    if matching.is_empty() {
        return Verdict::NoMatchingRole;
    }

    if matching
        .iter()
        .any(|drs| drs.dimensions().all(|dim| consumes(cell, dim, taxonomy)))
    {
        Verdict::Valid
    } else {
        Verdict::UnsatisfiedDimensions
    }
}

fn consumes(cell: &Cell, dimension: &DrsDimension, taxonomy: &TaxonomyIndex) -> bool {
    match cell
        .constraint(&Aspect::Dimension(dimension.qname.clone()))
        .map(|c| &c.value)
    {
        Some(MemberValue::Open) => true,
        Some(MemberValue::Fixed(member)) => dimension.allows(member),
        None => taxonomy.default_member(&dimension.qname).is_some(),
    }
}

/// True when a DRS role names the table code: the whole role, or its last
/// `/` or `#` segment, equals the code (spaces in the code may appear as
/// underscores).
pub fn role_matches_code(role: &str, code: &str) -> bool {
    if role == code {
        return true;
    }
    let tail = role.rsplit(|c| c == '/' || c == '#').next().unwrap_or(role);
    tail == code || tail == code.replace(' ', "_")
}

/// Resolves `cell` and grays it when validation fails. Returns the verdict.
pub fn resolve_and_validate(
    cell: &mut Cell,
    table: &CompiledTable,
    nodes: &CellNodes<'_>,
    taxonomy: &TaxonomyIndex,
    open_dimensions: &mut BTreeMap<Aspect, Axis>,
) -> Verdict {
    resolve(cell, table, nodes, open_dimensions);
    let verdict = validate(cell, table.code.as_deref(), taxonomy);
    if !verdict.is_valid() {
        cell.is_grayed = true;
    }
    trace!(
        table = %table.id,
        address = cell.address.as_ref().map(|a| a.key()).unwrap_or_default(),
        %verdict,
        "cell validated"
    );
    verdict
}
