//! FILENAME: server/tests/common/mod.rs
//! Test doubles and harness for the calculation service integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use engine_bridge::{
    CellValue, EngineConnector, EngineError, EnginePool, EngineSession, OutputRegion,
};
use scenario::SlotValue;
use server::AppState;

// ============================================================================
// RECORDING ENGINE DOUBLE
// ============================================================================

/// One engine call as observed by the double, tagged with the instance that
/// served it.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Write {
        instance: usize,
        slot: String,
        value: SlotValue,
    },
    Calculate {
        instance: usize,
    },
    Read {
        instance: usize,
    },
}

pub struct RecordingSession {
    instance: usize,
    log: Arc<Mutex<Vec<EngineCall>>>,
    table: Vec<Vec<CellValue>>,
    write_delay: Duration,
    fail_compute: bool,
}

impl EngineSession for RecordingSession {
    fn write_slot(&mut self, slot: &str, value: &SlotValue) -> Result<(), EngineError> {
        if !self.write_delay.is_zero() {
            std::thread::sleep(self.write_delay);
        }
        self.log.lock().unwrap().push(EngineCall::Write {
            instance: self.instance,
            slot: slot.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    fn recalculate(&mut self) -> Result<(), EngineError> {
        if self.fail_compute {
            return Err(EngineError::Compute("stub fault".to_string()));
        }
        self.log
            .lock()
            .unwrap()
            .push(EngineCall::Calculate { instance: self.instance });
        Ok(())
    }

    fn read_region(&mut self, _region: &OutputRegion) -> Result<Vec<Vec<CellValue>>, EngineError> {
        self.log
            .lock()
            .unwrap()
            .push(EngineCall::Read { instance: self.instance });
        Ok(self.table.clone())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

pub struct RecordingConnector {
    log: Arc<Mutex<Vec<EngineCall>>>,
    connects: Arc<AtomicUsize>,
    table: Vec<Vec<CellValue>>,
    write_delay: Duration,
    fail_compute: bool,
}

impl EngineConnector for RecordingConnector {
    fn connect(&self) -> Result<Box<dyn EngineSession>, EngineError> {
        let instance = self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingSession {
            instance,
            log: Arc::clone(&self.log),
            table: self.table.clone(),
            write_delay: self.write_delay,
            fail_compute: self.fail_compute,
        }))
    }
}

/// A connector whose instances cannot even be opened.
pub struct UnreachableConnector;

impl EngineConnector for UnreachableConnector {
    fn connect(&self) -> Result<Box<dyn EngineSession>, EngineError> {
        Err(EngineError::Unavailable("no host".to_string()))
    }
}

// ============================================================================
// TEST HARNESS
// ============================================================================

pub struct TestHarness {
    pub state: Arc<AppState>,
    pub log: Arc<Mutex<Vec<EngineCall>>>,
    pub connects: Arc<AtomicUsize>,
}

impl TestHarness {
    /// Harness around a recording double that answers with `table`, shaped
    /// `rows` x `cols`. Pool of one instance, short bounded wait.
    pub fn with_table(table: Vec<Vec<CellValue>>, rows: usize, cols: usize) -> Self {
        Self::build(table, rows, cols, Duration::ZERO, false)
    }

    /// Same, but every slot write sleeps briefly - enough for a second
    /// request to sneak its writes in, were the pool not exclusive.
    pub fn with_slow_writes(table: Vec<Vec<CellValue>>, rows: usize, cols: usize) -> Self {
        Self::build(table, rows, cols, Duration::from_millis(2), false)
    }

    /// Harness whose engine fails every recomputation.
    pub fn with_failing_compute() -> Self {
        Self::build(Vec::new(), 1, 1, Duration::ZERO, true)
    }

    fn build(
        table: Vec<Vec<CellValue>>,
        rows: usize,
        cols: usize,
        write_delay: Duration,
        fail_compute: bool,
    ) -> Self {
        let log = Arc::new(Mutex::new(Vec::new()));
        let connects = Arc::new(AtomicUsize::new(0));
        let connector = RecordingConnector {
            log: Arc::clone(&log),
            connects: Arc::clone(&connects),
            table,
            write_delay,
            fail_compute,
        };
        let state = AppState {
            pool: EnginePool::new(Box::new(connector), 1, Duration::from_millis(100)),
            output_region: OutputRegion::new("D2:J9", rows, cols),
        };
        TestHarness {
            state: Arc::new(state),
            log,
            connects,
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.log.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

/// The 2x2 stub table used by several tests.
pub fn sample_table() -> Vec<Vec<CellValue>> {
    vec![
        vec![CellValue::Number(1.0), CellValue::Text("a".to_string())],
        vec![CellValue::Number(2.0), CellValue::Text("b".to_string())],
    ]
}
