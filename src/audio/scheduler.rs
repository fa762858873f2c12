//! Sound scheduling.
//!
//! Arms at most one beep trigger and one countdown trigger at a time, each a
//! tokio task that sleeps until its cue is due. Re-arming always cancels the
//! previous trigger of the same kind first.

use super::engine::{CueBackend, LoadedClip};
use super::{AudioConfig, AudioError, AudioEvent, Cue};
use crate::workouts::types::{NextSegment, Segment, SegmentKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Beep lead for ordinary segments, in seconds.
const DEFAULT_BEEP_LEAD_SECS: u32 = 5;
/// Beep lead for a one minute break, in seconds.
const LONG_BREAK_BEEP_LEAD_SECS: u32 = 10;
const LONG_BREAK_SECS: u32 = 60;

/// The two kinds of delayed trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// Beep shortly before the segment ends
    Beep,
    /// Countdown cue timed to end as the next exercise starts
    Countdown,
}

impl TriggerKind {
    fn cue(&self) -> Cue {
        match self {
            TriggerKind::Beep => Cue::Beep,
            TriggerKind::Countdown => Cue::Countdown,
        }
    }
}

/// Delays after which each trigger should fire, if armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerPlan {
    pub beep: Option<Duration>,
    pub countdown: Option<Duration>,
}

/// Seconds before the end of `segment` at which the beep sounds.
pub fn beep_lead_secs(segment: &Segment) -> u32 {
    if segment.kind == SegmentKind::Break && segment.duration == LONG_BREAK_SECS {
        LONG_BREAK_BEEP_LEAD_SECS
    } else {
        DEFAULT_BEEP_LEAD_SECS
    }
}

/// Compute trigger delays for the current segment.
///
/// The beep is skipped once `time_left` is within its lead. The countdown is
/// only planned ahead of an exercise, when its cue has a known length and
/// would still start in the future.
pub fn plan_triggers(
    time_left: u32,
    current: &Segment,
    next: Option<&NextSegment>,
    countdown_duration: Duration,
) -> TriggerPlan {
    let beep_lead = beep_lead_secs(current);
    let beep = (time_left > beep_lead).then(|| Duration::from_secs((time_left - beep_lead) as u64));

    let countdown = match next {
        Some(next) if next.segment.kind == SegmentKind::Exercise && !countdown_duration.is_zero() => {
            let start_in = time_left as f64 - countdown_duration.as_secs_f64();
            (start_in > 0.0).then(|| Duration::from_secs_f64(start_in))
        }
        _ => None,
    };

    TriggerPlan { beep, countdown }
}

/// Plays cues and manages their delayed triggers.
///
/// Arming methods spawn tokio tasks and must be called from within a runtime.
pub struct SoundScheduler {
    backend: Arc<dyn CueBackend>,
    config: AudioConfig,
    clips: Arc<RwLock<HashMap<Cue, LoadedClip>>>,
    preloaded: AtomicBool,
    beep_trigger: Mutex<Option<JoinHandle<()>>>,
    countdown_trigger: Mutex<Option<JoinHandle<()>>>,
    event_tx: broadcast::Sender<AudioEvent>,
}

impl SoundScheduler {
    pub fn new(backend: Arc<dyn CueBackend>, config: AudioConfig) -> Self {
        let (event_tx, _) = broadcast::channel(100);

        Self {
            backend,
            config,
            clips: Arc::new(RwLock::new(HashMap::new())),
            preloaded: AtomicBool::new(false),
            beep_trigger: Mutex::new(None),
            countdown_trigger: Mutex::new(None),
            event_tx,
        }
    }

    /// Subscribe to audio events
    pub fn subscribe_events(&self) -> broadcast::Receiver<AudioEvent> {
        self.event_tx.subscribe()
    }

    /// Load all cues concurrently. Returns how many loaded.
    ///
    /// Runs once per scheduler; later calls return immediately. A cue that
    /// fails to load is logged and never plays.
    pub async fn preload(&self) -> usize {
        if self.preloaded.swap(true, Ordering::SeqCst) {
            return self.loaded_count();
        }
        if !self.config.enabled {
            tracing::info!("Audio cues disabled");
            return 0;
        }
        if !self.backend.is_available() {
            tracing::info!("Audio output unavailable, cues disabled");
            return 0;
        }

        let loads = Cue::ALL.into_iter().map(|cue| {
            let backend = self.backend.clone();
            let path = self.config.cue_path(cue);
            async move {
                let result = tokio::task::spawn_blocking(move || backend.load(cue, &path))
                    .await
                    .unwrap_or_else(|e| {
                        Err(AudioError::LoadFailed {
                            cue,
                            reason: e.to_string(),
                        })
                    });
                (cue, result)
            }
        });
        let results = futures::future::join_all(loads).await;

        let mut clips = self.clips.write().unwrap_or_else(PoisonError::into_inner);
        for (cue, result) in results {
            match result {
                Ok(clip) => {
                    tracing::debug!("Loaded cue {} ({:?})", cue, clip.duration);
                    let _ = self.event_tx.send(AudioEvent::CueLoaded {
                        cue,
                        duration: clip.duration,
                    });
                    clips.insert(cue, clip);
                }
                Err(e) => {
                    tracing::warn!("Failed to load audio: {}: {}", cue, e);
                    let _ = self.event_tx.send(AudioEvent::CueLoadFailed {
                        cue,
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!("Loaded {} of {} cues", clips.len(), Cue::ALL.len());
        clips.len()
    }

    pub fn is_loaded(&self, cue: Cue) -> bool {
        self.clips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&cue)
    }

    fn loaded_count(&self) -> usize {
        self.clips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Length of a cue, zero when it is not loaded.
    pub fn cue_duration(&self, cue: Cue) -> Duration {
        self.clips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&cue)
            .map(|clip| clip.duration)
            .unwrap_or_default()
    }

    /// Play a cue from the start. Failures are logged and swallowed.
    pub fn play(&self, cue: Cue) {
        let clip = self
            .clips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&cue)
            .cloned();
        if let Some(clip) = clip {
            play_clip(self.backend.as_ref(), &clip, &self.config, &self.event_tx);
        }
    }

    /// Arm the beep and countdown triggers for the current segment.
    ///
    /// Any previously armed trigger of either kind is cancelled first.
    pub fn schedule_for_segment<F>(&self, time_left: u32, current: &Segment, next_segment: F)
    where
        F: FnOnce() -> Option<NextSegment>,
    {
        let next = next_segment();
        let plan = plan_triggers(
            time_left,
            current,
            next.as_ref(),
            self.cue_duration(Cue::Countdown),
        );

        self.arm(TriggerKind::Beep, plan.beep);
        self.arm(TriggerKind::Countdown, plan.countdown);
    }

    fn slot(&self, kind: TriggerKind) -> &Mutex<Option<JoinHandle<()>>> {
        match kind {
            TriggerKind::Beep => &self.beep_trigger,
            TriggerKind::Countdown => &self.countdown_trigger,
        }
    }

    fn arm(&self, kind: TriggerKind, delay: Option<Duration>) {
        let mut slot = self.slot(kind).lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(stale) = slot.take() {
            stale.abort();
        }

        let Some(delay) = delay else {
            return;
        };
        let cue = kind.cue();
        let Some(clip) = self
            .clips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&cue)
            .cloned()
        else {
            tracing::debug!("Not arming {:?} trigger, cue {} not loaded", kind, cue);
            return;
        };

        let backend = self.backend.clone();
        let config = self.config.clone();
        let event_tx = self.event_tx.clone();
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            play_clip(backend.as_ref(), &clip, &config, &event_tx);
        }));

        tracing::debug!("Armed {:?} trigger in {:?}", kind, delay);
        let _ = self.event_tx.send(AudioEvent::TriggerArmed { kind, delay });
    }

    /// Whether a trigger of this kind is armed and has not fired yet.
    pub fn is_armed(&self, kind: TriggerKind) -> bool {
        self.slot(kind)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancel both triggers. Idempotent.
    pub fn cancel_scheduled(&self) {
        let mut cancelled = false;
        for kind in [TriggerKind::Beep, TriggerKind::Countdown] {
            let handle = self
                .slot(kind)
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(handle) = handle {
                handle.abort();
                cancelled = true;
            }
        }

        if cancelled {
            tracing::debug!("Cancelled scheduled cues");
            let _ = self.event_tx.send(AudioEvent::TriggersCancelled);
        }
    }

    /// Play the rest cue when entering a break.
    pub fn on_segment_advance(&self, segment: &Segment) {
        if segment.kind == SegmentKind::Break {
            self.play(Cue::Rest);
        }
    }

    /// Play the countdown cue. Returns its length so the caller can delay the
    /// first tick until it has finished.
    pub fn on_workout_start(&self) -> Duration {
        let duration = self.cue_duration(Cue::Countdown);
        self.play(Cue::Countdown);
        duration
    }

    pub fn on_workout_complete(&self) {
        self.cancel_scheduled();
        self.play(Cue::Complete);
    }

    /// Cancel triggers on pause; re-arm them from `time_left` on resume.
    pub fn on_pause_toggle<F>(&self, paused: bool, time_left: u32, current: &Segment, next_segment: F)
    where
        F: FnOnce() -> Option<NextSegment>,
    {
        if paused {
            self.cancel_scheduled();
        } else {
            self.schedule_for_segment(time_left, current, next_segment);
        }
    }

    pub fn on_reset(&self) {
        self.cancel_scheduled();
    }
}

impl Drop for SoundScheduler {
    fn drop(&mut self) {
        self.cancel_scheduled();
    }
}

fn play_clip(
    backend: &dyn CueBackend,
    clip: &LoadedClip,
    config: &AudioConfig,
    event_tx: &broadcast::Sender<AudioEvent>,
) {
    if !config.enabled {
        return;
    }

    match backend.play(clip, config.gain()) {
        Ok(()) => {
            let _ = event_tx.send(AudioEvent::CuePlayed { cue: clip.cue });
        }
        Err(e) => {
            tracing::warn!("Failed to play {}: {}", clip.cue, e);
            let _ = event_tx.send(AudioEvent::Error {
                message: e.to_string(),
            });
        }
    }
}
