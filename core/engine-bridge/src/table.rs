//! FILENAME: core/engine-bridge/src/table.rs
//! PURPOSE: The fixed-shape result read back from the calculation engine.
//! CONTEXT: The output region's bounds are a contract with the engine
//! artifact, so the shape is checked on read and never derived from the
//! data. A table lives for one request and is discarded after serialization.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A scalar read from one output cell. Serializes untagged, so a cell is a
/// bare JSON number, string, boolean, or null on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Boolean(bool),
    Empty,
}

/// A named rectangular output region in the engine's model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRegion {
    /// A1-style range reference, e.g. "D2:J9".
    pub range: String,
    pub rows: usize,
    pub cols: usize,
}

impl OutputRegion {
    pub fn new(range: impl Into<String>, rows: usize, cols: usize) -> Self {
        OutputRegion {
            range: range.into(),
            rows,
            cols,
        }
    }
}

/// The rectangular result of one recalculation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTable {
    rows: Vec<Vec<CellValue>>,
}

impl OutputTable {
    /// Wraps raw rows after checking them against the region's contracted
    /// shape. A mismatch means the artifact and this build disagree.
    pub fn from_rows(
        rows: Vec<Vec<CellValue>>,
        region: &OutputRegion,
    ) -> Result<Self, EngineError> {
        if rows.len() != region.rows {
            return Err(EngineError::Read(format!(
                "expected {} rows from {}, got {}",
                region.rows,
                region.range,
                rows.len()
            )));
        }
        for (index, row) in rows.iter().enumerate() {
            if row.len() != region.cols {
                return Err(EngineError::Read(format!(
                    "expected {} columns in row {} of {}, got {}",
                    region.cols,
                    index,
                    region.range,
                    row.len()
                )));
            }
        }
        Ok(OutputTable { rows })
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }
}
