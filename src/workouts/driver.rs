//! Periodic tick drivers.
//!
//! A driver produces one [`TickEvent`] per elapsed second while attached. The
//! timer only attaches and detaches it; the host owns the receiving end and
//! calls [`WorkoutTimer::tick`](super::engine::WorkoutTimer::tick) for each event.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One elapsed second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent;

/// An external 1 Hz periodic-callback facility.
pub trait TickDriver: Send {
    /// Attach the driver. The first tick arrives `lead_in + TICK_PERIOD` from now.
    fn start(&mut self, lead_in: Duration);

    /// Detach the driver. No ticks are delivered afterwards.
    fn stop(&mut self);

    /// Whether the driver is attached.
    fn is_running(&self) -> bool;
}

/// Driver backed by a tokio interval task.
///
/// Must be started from within a tokio runtime.
pub struct IntervalDriver {
    tx: mpsc::UnboundedSender<TickEvent>,
    handle: Option<JoinHandle<()>>,
}

impl IntervalDriver {
    /// Create a driver and the receiver its ticks are delivered on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TickEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, handle: None }, rx)
    }
}

impl TickDriver for IntervalDriver {
    fn start(&mut self, lead_in: Duration) {
        self.stop();

        let tx = self.tx.clone();
        let first = tokio::time::Instant::now() + lead_in + TICK_PERIOD;
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(first, TICK_PERIOD);
            loop {
                interval.tick().await;
                if tx.send(TickEvent).is_err() {
                    tracing::debug!("Tick receiver dropped, stopping driver");
                    break;
                }
            }
        }));

        tracing::debug!("Tick driver started with {:?} lead-in", lead_in);
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Tick driver stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for IntervalDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Driver for hosts that call `tick()` themselves.
///
/// Only records whether it is attached and the last lead-in it was given.
#[derive(Debug, Default)]
pub struct ManualDriver {
    running: bool,
    last_lead_in: Option<Duration>,
}

impl ManualDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_lead_in(&self) -> Option<Duration> {
        self.last_lead_in
    }
}

impl TickDriver for ManualDriver {
    fn start(&mut self, lead_in: Duration) {
        self.running = true;
        self.last_lead_in = Some(lead_in);
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
