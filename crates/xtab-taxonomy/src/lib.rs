#![deny(unsafe_code)]

pub mod base_set;
pub mod concept;
pub mod drs;
pub mod error;
pub mod hash;
pub mod index;
pub mod manifest;
pub mod package;

pub use crate::base_set::{BaseSet, BaseSetKey, Relationship, STANDARD_LINK_ROLE};
pub use crate::concept::{Concept, PeriodType};
pub use crate::drs::{Drs, DrsDimension, Hypercube, HypercubeArcRole};
pub use crate::error::TaxonomyError;
pub use crate::index::{TaxonomyDocument, TaxonomyIndex};
pub use crate::package::{TaxonomyPackage, VerifySummary};
