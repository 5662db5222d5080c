//! FILENAME: core/engine-bridge/src/adapter.rs
// PURPOSE: The write -> recalculate -> read cycle against one engine session.

use scenario::SlotWrite;

use crate::error::EngineError;
use crate::session::EngineSession;
use crate::table::{OutputRegion, OutputTable};

/// Runs one full recalculation cycle: applies every slot write in order,
/// forces a full recompute, then reads the contracted output region.
///
/// Write order is preserved exactly as given - the engine may evaluate
/// cross-dependent inputs in write order. Results are never cached;
/// identical inputs on two calls each run the full cycle, because the
/// engine's internal state is not inspectable or trustworthy to reuse.
pub fn recalculate(
    session: &mut dyn EngineSession,
    writes: &[SlotWrite],
    region: &OutputRegion,
) -> Result<OutputTable, EngineError> {
    for write in writes {
        session.write_slot(write.slot, &write.value)?;
    }
    session.recalculate()?;
    let rows = session.read_region(region)?;
    OutputTable::from_rows(rows, region)
}
