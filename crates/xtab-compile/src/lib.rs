#![deny(unsafe_code)]

//! Compilation of table definitions into balanced axis trees and headers.
//!
//! The phases run strictly in order: [`compile`], [`balance`],
//! [`build_headers`]. Each table gets its own [`CompiledTable`]; the
//! taxonomy index is only read.

pub mod balance;
pub mod compiler;
pub mod header;
pub mod structure;

pub use crate::balance::{balance, balance_axis};
pub use crate::compiler::compile;
pub use crate::header::{Header, HeaderEntry, Headers, RenderOptions, build_axis_header, build_headers};
pub use crate::structure::{AxisTree, CompiledTable, NodeId, Origin, StructureNode};
