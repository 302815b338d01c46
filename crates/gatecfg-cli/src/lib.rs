//! # gatecfg-cli
//!
//! Command-line interface for gatecfg.
//!
//! ## Commands
//!
//! - `gatecfg verify`: Parse and check the configuration directory
//! - `gatecfg configure`: Verify, then write job environment files and reload services
//! - `gatecfg query`: Show where an option's effective value comes from
//! - `gatecfg list`: List modules in processing order
//! - `gatecfg attributes`: Print the merged attribute mapping
//! - `gatecfg services`: Print the services the configuration enables

pub mod commands;
pub mod output;
pub mod services;

pub use commands::Cli;
