use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Configuration stored in ~/.tagify/config.json
///
/// Every field has a default, so a missing or partial file is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding `tagify-contacts.json`. Defaults to `~/.tagify`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Where exports are written. Defaults to the user's documents folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<String>,
    #[serde(default = "default_export_prefix")]
    pub export_file_prefix: String,
}

fn default_export_prefix() -> String {
    "contacts".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            export_dir: None,
            export_file_prefix: default_export_prefix(),
        }
    }
}

impl Config {
    pub fn resolve_data_dir(&self) -> Result<PathBuf, GatewayError> {
        match self.data_dir.as_deref().filter(|d| !d.is_empty()) {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => crate::state::state_dir(),
        }
    }

    /// Configured export dir, else the documents folder, else
    /// `~/.tagify/exports`.
    pub fn resolve_export_dir(&self) -> Result<PathBuf, GatewayError> {
        if let Some(dir) = self.export_dir.as_deref().filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(docs) = dirs::document_dir() {
            return Ok(docs);
        }
        Ok(crate::state::state_dir()?.join("exports"))
    }
}
