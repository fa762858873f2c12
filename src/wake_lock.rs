//! Screen wake lock.
//!
//! Keeps the display on while a workout runs. The platform capability is
//! injected; when it is missing or a request fails the guard degrades to a
//! no-op and the workout carries on.

use std::sync::{Arc, Mutex, PoisonError};

/// Errors from a wake lock capability.
#[derive(Debug, thiserror::Error)]
pub enum WakeLockError {
    #[error("Wake lock request failed: {0}")]
    RequestFailed(String),

    #[error("Wake lock release failed: {0}")]
    ReleaseFailed(String),
}

/// A platform facility able to keep the screen awake.
pub trait WakeLock: Send {
    fn request(&mut self) -> Result<(), WakeLockError>;

    fn release(&mut self) -> Result<(), WakeLockError>;
}

/// Best-effort wake lock holder.
pub struct WakeLockGuard {
    capability: Option<Box<dyn WakeLock>>,
    held: bool,
}

impl WakeLockGuard {
    /// Guard over a supported capability.
    pub fn new(capability: Box<dyn WakeLock>) -> Self {
        Self {
            capability: Some(capability),
            held: false,
        }
    }

    /// Guard for platforms without a wake lock.
    pub fn unsupported() -> Self {
        Self {
            capability: None,
            held: false,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.capability.is_some()
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Acquire the lock. Silently does nothing if unsupported or refused.
    pub fn acquire(&mut self) {
        if self.held {
            return;
        }
        let Some(capability) = self.capability.as_mut() else {
            return;
        };

        match capability.request() {
            Ok(()) => {
                self.held = true;
                tracing::info!("Screen wake lock acquired");
            }
            Err(e) => tracing::warn!("Wake lock not supported or failed: {}", e),
        }
    }

    /// Release the lock if held.
    pub fn release(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;

        if let Some(capability) = self.capability.as_mut() {
            match capability.release() {
                Ok(()) => tracing::info!("Screen wake lock released"),
                Err(e) => tracing::warn!("{}", e),
            }
        }
    }
}

impl Drop for WakeLockGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for WakeLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WakeLockGuard")
            .field("supported", &self.is_supported())
            .field("held", &self.held)
            .finish()
    }
}

/// Counters shared with a [`MockWakeLock`].
#[derive(Debug, Default)]
pub struct WakeLockCounts {
    pub requests: u32,
    pub releases: u32,
}

/// Mock wake lock for testing.
#[derive(Debug, Clone, Default)]
pub struct MockWakeLock {
    counts: Arc<Mutex<WakeLockCounts>>,
    refuse: bool,
}

impl MockWakeLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capability that refuses every request.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> u32 {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .requests
    }

    pub fn releases(&self) -> u32 {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .releases
    }
}

impl WakeLock for MockWakeLock {
    fn request(&mut self) -> Result<(), WakeLockError> {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .requests += 1;
        if self.refuse {
            return Err(WakeLockError::RequestFailed("refused".to_string()));
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), WakeLockError> {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .releases += 1;
        Ok(())
    }
}
