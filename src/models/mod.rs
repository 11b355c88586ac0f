//! Domain model for the sync daemon.
//!
//! There is a single entity, [`Project`]: the in-memory record behind both
//! on-disk representations. Instances are transient: every filesystem event
//! reads a fresh record from disk, and nothing survives across events.

mod project;

pub use project::*;
