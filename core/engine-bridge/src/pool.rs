//! FILENAME: core/engine-bridge/src/pool.rs
//! PURPOSE: Fixed-size pool of engine instances with scoped leases.
//! CONTEXT: An engine instance is a scarce single-writer resource; two
//! requests interleaving writes into one instance would corrupt each
//! other's results. The pool enforces at-most-one in-flight cycle per
//! instance: a request holds a lease for its whole write -> recompute ->
//! read cycle and the lease guarantees release on every exit path.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;

use scenario::SlotWrite;

use crate::adapter;
use crate::error::{AcquireError, EngineError};
use crate::session::{EngineConnector, EngineSession};
use crate::table::{OutputRegion, OutputTable};

pub struct EnginePool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    connector: Box<dyn EngineConnector>,
    /// Connected instances parked between requests.
    idle: Mutex<Vec<Box<dyn EngineSession>>>,
    permits: Arc<Semaphore>,
    acquire_timeout: Duration,
}

impl EnginePool {
    /// A pool of up to `size` equivalent engine instances. Instances are
    /// opened lazily through the connector on first use.
    pub fn new(
        connector: Box<dyn EngineConnector>,
        size: usize,
        acquire_timeout: Duration,
    ) -> Self {
        EnginePool {
            inner: Arc::new(PoolInner {
                connector,
                idle: Mutex::new(Vec::new()),
                permits: Arc::new(Semaphore::new(size)),
                acquire_timeout,
            }),
        }
    }

    /// Waits up to the configured timeout for a free instance. The timeout
    /// covers only this queueing; once a lease exists the cycle runs to
    /// completion without any deadline.
    pub async fn acquire(&self) -> Result<EngineLease, AcquireError> {
        let waited_ms = self.inner.acquire_timeout.as_millis() as u64;
        let permit = match timeout(
            self.inner.acquire_timeout,
            Arc::clone(&self.inner.permits).acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => {
                return Err(AcquireError::Engine(EngineError::Unavailable(
                    "engine pool is shut down".to_string(),
                )))
            }
            Err(_) => return Err(AcquireError::Exhausted { waited_ms }),
        };

        let parked = self.inner.idle.lock().unwrap().pop();
        let session = match parked {
            Some(session) => session,
            None => self.inner.connector.connect()?,
        };

        Ok(EngineLease {
            session: Some(session),
            pool: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    /// Number of connected instances currently parked.
    pub fn parked(&self) -> usize {
        self.inner.idle.lock().unwrap().len()
    }
}

/// Exclusive use of one engine instance for one request. Dropping the lease
/// parks the instance again and wakes one queued acquire.
pub struct EngineLease {
    session: Option<Box<dyn EngineSession>>,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl EngineLease {
    /// Runs one full cycle on the leased instance. On failure the instance
    /// is discarded, not parked: it may hold partially written inputs, and
    /// such state is never silently reused by a later request.
    pub fn recalculate(
        &mut self,
        writes: &[SlotWrite],
        region: &OutputRegion,
    ) -> Result<OutputTable, EngineError> {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => {
                return Err(EngineError::Unavailable(
                    "engine session already discarded".to_string(),
                ))
            }
        };
        match adapter::recalculate(session.as_mut(), writes, region) {
            Ok(table) => Ok(table),
            Err(err) => {
                self.discard();
                Err(err)
            }
        }
    }

    /// Closes and drops the underlying instance instead of parking it.
    pub fn discard(&mut self) {
        if let Some(mut session) = self.session.take() {
            let _ = session.close();
        }
    }
}

impl std::fmt::Debug for EngineLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineLease")
            .field("has_session", &self.session.is_some())
            .finish()
    }
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.pool.idle.lock().unwrap().push(session);
        }
        // The permit releases on drop, waking one queued acquire.
    }
}
