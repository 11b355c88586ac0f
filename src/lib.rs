//! project-json-sync keeps two project-description files in one directory
//! synchronized: a structured project file (`project.toml`) and its legacy
//! JSON sidecar (`project.json`).
//!
//! The daemon watches both files. When the structured file changes it is
//! re-read and projected to camelCase-keyed JSON, overwriting the sidecar.
//! When the sidecar changes its fields are merged onto a freshly read
//! structured record; by default the merged record is discarded (the legacy
//! behavior), with opt-in persistence back to the structured file.

pub mod models;
pub mod project_file;
pub mod sync;
