//! Chainpoint Node Discovery
//!
//! Finds a small set of reachable Chainpoint nodes by reading one randomly
//! chosen node catalog and health-checking its candidates in order.

pub mod catalog;
pub mod directory;

pub use catalog::{CatalogEntry, ProbeResult};
pub use directory::{NodeAddress, NodeDirectory};
