//! The project-model collaborator: reading and writing the structured
//! project file, and rendering its JSON projection for the sidecar.

use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Project;

/// Conventional name of the structured project file.
pub const PROJECT_FILE_NAME: &str = "project.toml";

/// Fixed name of the legacy JSON sidecar.
pub const PROJECT_JSON_FILE_NAME: &str = "project.json";

/// Reads and parses the structured project file.
pub fn read_project(path: &Path) -> Result<Project> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read project file {}", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("Failed to parse project file {}", path.display()))
}

/// Writes a record back to the structured project file.
///
/// Only used when merge persistence is enabled; the legacy flow never writes
/// in this direction.
pub fn write_project(path: &Path, project: &Project) -> Result<()> {
    let text = toml::to_string_pretty(project).context("Failed to serialize project")?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write project file {}", path.display()))?;
    Ok(())
}

/// Serializer configuration for the sidecar projection.
///
/// Constructed once by the CLI layer and owned by the daemon instance, rather
/// than living in process-wide state. The camelCase property names come from
/// the model's serde attributes; this only controls formatting.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonProjection {
    pub pretty: bool,
}

impl JsonProjection {
    /// Renders a record as the sidecar's JSON text.
    pub fn render(&self, project: &Project) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(project)
        } else {
            serde_json::to_string(project)
        };
        json.context("Failed to serialize project to JSON")
    }
}
