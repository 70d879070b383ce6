#![deny(unsafe_code)]

pub mod resolve;
pub mod validator;

pub use crate::resolve::{CellNodes, resolve};
pub use crate::validator::{Verdict, resolve_and_validate, role_matches_code, validate};
