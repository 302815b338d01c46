//! # gatecfg-core
//!
//! Shared vocabulary for the gatecfg workspace: the unified error type, the
//! run verdict, and the provenance types every other crate passes around.

pub mod error;
pub mod types;

pub use error::{GateError, Result};
pub use types::*;
