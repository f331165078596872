use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Knobs for one conversion call.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    /// Name hint for the top-level type. Inferred, so a `title` or a
    /// top-level `$ref` target name replaces it.
    pub root_name: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self { root_name: "Root".to_string() }
    }
}

impl ConvertOptions {
    /// Parse options from JSON text, reporting the JSON path of the first
    /// offending field.
    pub fn from_json_str(src: &str) -> Result<Self> {
        let de = &mut serde_json::Deserializer::from_str(src);
        serde_path_to_error::deserialize(de).map_err(|err| Error::Config {
            path: err.path().to_string(),
            message: err.into_inner().to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path)?;
        Self::from_json_str(&src)
    }
}
