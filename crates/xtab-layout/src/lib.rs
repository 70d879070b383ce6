#![deny(unsafe_code)]

//! Grid layout of compiled tables.
//!
//! [`render_table`] runs the whole pipeline for one table definition;
//! [`export`] projects a finished layout onto the DPM address map.

pub mod codes;
pub mod dpm;
pub mod generator;
pub mod pipeline;
pub mod text;

pub use crate::codes::{CodeCounter, code_for, label_code};
pub use crate::dpm::{DpmEntry, DpmMap, WILDCARD, export};
pub use crate::generator::lay_out;
pub use crate::pipeline::{render_table, render_tables};
pub use crate::text::render_text;
pub use xtab_compile::RenderOptions;
