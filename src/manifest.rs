//! package.json handling
//!
//! Only the `version` field is ever touched; every other field and the key
//! order are written back as they were read.

use std::path::Path;

use serde_json::{Map, Value};

use crate::domain::Version;
use crate::error::{ReleaseTrainError, Result};

/// A package manifest held as a raw JSON object
#[derive(Debug, Clone, PartialEq)]
pub struct PackageManifest {
    fields: Map<String, Value>,
}

impl PackageManifest {
    /// Parse manifest content
    pub fn parse(content: &str) -> Result<Self> {
        match serde_json::from_str(content)? {
            Value::Object(fields) => Ok(PackageManifest { fields }),
            _ => Err(ReleaseTrainError::manifest(
                "Manifest root must be a JSON object",
            )),
        }
    }

    /// Load manifest from path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReleaseTrainError::manifest(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Save manifest to path
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render()?).map_err(|e| {
            ReleaseTrainError::manifest(format!("Cannot write '{}': {}", path.display(), e))
        })
    }

    /// Serialize with two-space indentation and a trailing newline
    pub fn render(&self) -> Result<String> {
        let mut content = serde_json::to_string_pretty(&self.fields)?;
        content.push('\n');
        Ok(content)
    }

    /// Raw version string
    pub fn version_str(&self) -> Result<&str> {
        self.fields
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| ReleaseTrainError::manifest("Manifest has no string 'version' field"))
    }

    /// Parsed version
    pub fn version(&self) -> Result<Version> {
        Version::parse(self.version_str()?)
    }

    /// Replace the version, leaving all other fields untouched
    pub fn set_version(&mut self, version: &Version) {
        self.fields
            .insert("version".to_string(), Value::String(version.to_string()));
    }
}
