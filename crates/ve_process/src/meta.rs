use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use crate::step::ProcessFlags;

/// Per-scene processing options, read from a toml file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProcessMeta {
    /// Split meshes with mixed primitive types
    pub sort_by_primitive_type: bool,
    /// Process meshes on all cores
    pub parallel: bool,
    /// Validate the scene before and after processing
    pub validate: bool,
}

impl Default for ProcessMeta {
    fn default() -> Self {
        Self {
            sort_by_primitive_type: true,
            parallel: true,
            validate: true,
        }
    }
}

impl ProcessMeta {
    pub fn parse(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let meta: Self = toml::from_slice(&data)?;
        Ok(meta)
    }

    pub fn from_toml(value: &str) -> Result<Self> {
        Ok(toml::from_str(value)?)
    }

    pub fn flags(&self) -> ProcessFlags {
        let mut flags = ProcessFlags::empty();
        flags.set(ProcessFlags::SORT_BY_PTYPE, self.sort_by_primitive_type);
        flags.set(ProcessFlags::VALIDATE_STRUCTURE, self.validate);
        flags
    }
}
