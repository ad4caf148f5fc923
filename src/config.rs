//! Transpiler configuration surface.
//!
//! Consumed, not owned: the flags controlling interface discovery
//! (`include_referenced`, `attribute_filter`) are read by the host-side
//! discovery pass; the rest drive mapping, link resolution, and emission.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TranspileError;
use crate::naming::NamingStyle;

/// Subdirectory of the output root that receives the generated client
/// modules. Keeping them one level below the upstream data-type output is
/// what makes the source-linked imports relative (`../...`).
pub const CLIENT_SUBDIR: &str = "hublink";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspileOptions {
    /// Casing applied to emitted method names.
    pub method_style: NamingStyle,
    /// Casing applied to externally linked data-type identifiers, both when
    /// rendering them and when matching them against upstream output.
    pub type_style: NamingStyle,
    /// Output root shared with the upstream data-type generator.
    pub output_root: PathBuf,
    /// Whether types from referenced (not just directly compiled) modules
    /// participate in transpilation.
    pub include_referenced: bool,
    /// Whether attribute-based filtering of candidate interfaces is enabled.
    pub attribute_filter: bool,
    /// Extensions and overrides for the built-in primitive mapping table.
    pub primitive_overrides: HashMap<String, String>,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            method_style: NamingStyle::CamelCase,
            type_style: NamingStyle::None,
            output_root: PathBuf::from("generated"),
            include_referenced: false,
            attribute_filter: true,
            primitive_overrides: HashMap::new(),
        }
    }
}

impl TranspileOptions {
    /// Directory the generated client modules are written to.
    pub fn client_dir(&self) -> PathBuf {
        self.output_root.join(CLIENT_SUBDIR)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, TranspileError> {
        toml::from_str(contents).map_err(|err| TranspileError::Config(err.to_string()))
    }

    pub async fn load(path: &Path) -> Result<Self, TranspileError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| TranspileError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::from_toml_str(&contents)
    }
}
