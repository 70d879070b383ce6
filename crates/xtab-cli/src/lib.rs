//! CLI library components for the xtab table compiler.

#![deny(unsafe_code)]

pub mod commands;
pub mod logging;
pub mod types;
