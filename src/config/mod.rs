//! Configuration module.
//!
//! This module provides functionality for loading nameserver and query
//! input lists from local files or URLs.

pub mod loader;

pub use loader::InputLoader;
