//! Thread-safe engine handle

use std::sync::{Arc, Mutex, MutexGuard};

use signal_intake::Sample;

use crate::{BlinkEngine, EngineConfig, EngineError, EngineSnapshot};

/// Cloneable handle serialising all access to one engine.
///
/// At most one `update` runs at a time; snapshots are copies taken under the lock.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<BlinkEngine>>,
}

impl SharedEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self::from_engine(BlinkEngine::new(config)?))
    }

    pub fn from_engine(engine: BlinkEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BlinkEngine>, EngineError> {
        self.inner.lock().map_err(|_| EngineError::LockPoisoned)
    }

    /// Process one frame
    pub fn update(&self, sample: Sample) -> Result<EngineSnapshot, EngineError> {
        Ok(self.lock()?.update(sample))
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> Result<EngineSnapshot, EngineError> {
        Ok(self.lock()?.snapshot())
    }

    /// Start a new session
    pub fn reset(&self) -> Result<(), EngineError> {
        self.lock()?.reset();
        Ok(())
    }
}
