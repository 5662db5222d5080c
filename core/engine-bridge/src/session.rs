//! FILENAME: core/engine-bridge/src/session.rs
//! PURPOSE: Capability interface over one calculation engine instance.
//! CONTEXT: The engine's internals are opaque and unowned; everything this
//! repository needs from it is write-slot / recalculate / read-region /
//! close. Anything engine-like (a different workbook host, a reimplemented
//! formula engine, a test double) satisfies the same trait.

use scenario::SlotValue;

use crate::error::EngineError;
use crate::table::{CellValue, OutputRegion};

/// One live connection to one engine instance. A session is a single-writer
/// resource: it must be owned exclusively for a whole
/// write -> recalculate -> read cycle.
pub trait EngineSession: Send {
    /// Sets one named input slot to one value.
    fn write_slot(&mut self, slot: &str, value: &SlotValue) -> Result<(), EngineError>;

    /// Instructs the engine to fully recompute all dependent values.
    fn recalculate(&mut self) -> Result<(), EngineError>;

    /// Reads the named rectangular output region. The returned rows are raw;
    /// shape checking happens in `OutputTable::from_rows`.
    fn read_region(&mut self, region: &OutputRegion) -> Result<Vec<Vec<CellValue>>, EngineError>;

    /// Releases the instance. Best effort; a session being dropped after a
    /// failed cycle may no longer be able to say goodbye.
    fn close(&mut self) -> Result<(), EngineError>;
}

/// Opens fresh engine sessions for the pool.
pub trait EngineConnector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn EngineSession>, EngineError>;
}
