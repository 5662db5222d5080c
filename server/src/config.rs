//! FILENAME: server/src/config.rs
//! PURPOSE: Service configuration, optionally loaded from a JSON file.
//! CONTEXT: Every field has a default matching the engine artifact this
//! repository is contracted against, so the server runs with no config file
//! at all. The output region bounds live here next to the host settings
//! because both change together when the artifact changes.

use std::path::{Path, PathBuf};

use engine_bridge::{HostConfig, OutputRegion};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// How many engine instances may exist at once. Each instance is a
    /// separate host process; one is enough for a single workbook artifact.
    pub pool_size: usize,
    /// Bounded wait for a free engine instance before answering busy.
    pub acquire_timeout_ms: u64,
    pub engine: HostConfig,
    /// A1-style range of the engine's output table.
    pub output_range: String,
    pub output_rows: usize,
    pub output_cols: usize,
    /// Optional log file; stdout-only when absent.
    pub log_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0:8000".to_string(),
            pool_size: 1,
            acquire_timeout_ms: 15_000,
            engine: HostConfig::default(),
            output_range: "D2:J9".to_string(),
            output_rows: 8,
            output_cols: 7,
            log_file: None,
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn output_region(&self) -> OutputRegion {
        OutputRegion::new(self.output_range.clone(), self.output_rows, self.output_cols)
    }
}
