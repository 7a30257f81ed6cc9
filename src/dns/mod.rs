//! DNS module.
//!
//! This module provides the DNS testing core:
//! - Sequential query resolution with per-lookup timing
//! - Report assembly
//! - Core data types

pub mod report;
pub mod resolve;
pub mod types;

pub use report::{aggregate, Identity};
pub use resolve::QueryRunner;
pub use types::*;
