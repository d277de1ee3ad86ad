//! Command implementations for the CLI
//!
//! - diff: scrape both endpoints and print the differing series

pub mod diff;
