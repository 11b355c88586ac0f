use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A project's configuration, loaded from the structured project file.
///
/// The same record backs both on-disk representations: TOML for the
/// structured file, and a camelCase-keyed JSON projection for the legacy
/// sidecar (so `test_runner` renders as `testRunner`). Deserialization is
/// lenient: the sidecar may carry only a subset of fields, and missing ones
/// take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_runner: Option<String>,
    pub authors: Vec<String>,
    /// Dependency name → version requirement. Ordered so rewrites of the
    /// sidecar are byte-stable for unchanged content.
    pub dependencies: BTreeMap<String, String>,
}

impl Project {
    /// Copies every field of `other` onto `self` in place.
    ///
    /// This is the merge step of the sidecar-changed path: the freshly parsed
    /// sidecar record is mapped field-by-field onto the freshly read
    /// structured record. All fields are overwritten, including optional ones
    /// the sidecar left empty.
    pub fn merge_from(&mut self, other: Project) {
        self.name = other.name;
        self.version = other.version;
        self.description = other.description;
        self.test_runner = other.test_runner;
        self.authors = other.authors;
        self.dependencies = other.dependencies;
    }
}
