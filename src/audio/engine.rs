//! Audio Engine
//!
//! Cue decoding and playback backends. The rodio backend keeps its output
//! stream on a dedicated thread since rodio's stream handle is not `Send`.

use super::{AudioError, Cue};
use crossbeam::channel::{self, Sender};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, Sink, Source};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A decoded cue, ready to be played any number of times.
#[derive(Debug, Clone)]
pub struct LoadedClip {
    pub cue: Cue,
    /// Playback length
    pub duration: Duration,
    samples: Arc<[i16]>,
    channels: u16,
    sample_rate: u32,
}

impl LoadedClip {
    /// Build a clip from interleaved PCM samples.
    pub fn from_samples(cue: Cue, channels: u16, sample_rate: u32, samples: Vec<i16>) -> Self {
        let duration = if channels == 0 || sample_rate == 0 {
            Duration::ZERO
        } else {
            let frames = samples.len() / channels as usize;
            Duration::from_secs_f64(frames as f64 / sample_rate as f64)
        };

        Self {
            cue,
            duration,
            samples: samples.into(),
            channels,
            sample_rate,
        }
    }

    /// A clip with a known duration and no audio data.
    pub fn silent(cue: Cue, duration: Duration) -> Self {
        Self {
            cue,
            duration,
            samples: Arc::from(Vec::new()),
            channels: 1,
            sample_rate: 44_100,
        }
    }

    fn to_source(&self) -> SamplesBuffer<i16> {
        SamplesBuffer::new(self.channels, self.sample_rate, self.samples.to_vec())
    }
}

/// Trait for cue playback implementations
pub trait CueBackend: Send + Sync {
    /// Whether an output device is present
    fn is_available(&self) -> bool;

    /// Decode the file for a cue. May block.
    fn load(&self, cue: Cue, path: &Path) -> Result<LoadedClip, AudioError>;

    /// Play a clip from its start, restarting it if already playing
    fn play(&self, clip: &LoadedClip, volume: f32) -> Result<(), AudioError>;
}

enum OutputCommand {
    Play { clip: LoadedClip, volume: f32 },
}

/// Cue backend using rodio.
pub struct RodioBackend {
    tx: Sender<OutputCommand>,
    available: bool,
}

impl RodioBackend {
    /// Open the default output device on a background thread.
    ///
    /// A missing device is not an error: the backend reports itself
    /// unavailable and every play is dropped.
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded::<OutputCommand>();
        let (ready_tx, ready_rx) = channel::bounded::<bool>(1);

        let spawned = std::thread::Builder::new()
            .name("cue-output".to_string())
            .spawn(move || {
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(output) => output,
                    Err(e) => {
                        tracing::warn!("No audio output device: {}", e);
                        let _ = ready_tx.send(false);
                        return;
                    }
                };
                let _ = ready_tx.send(true);

                // One sink per cue so replaying a cue restarts it.
                let mut sinks: HashMap<Cue, Sink> = HashMap::new();
                for command in rx {
                    match command {
                        OutputCommand::Play { clip, volume } => {
                            if let Some(previous) = sinks.remove(&clip.cue) {
                                previous.stop();
                            }
                            match Sink::try_new(&handle) {
                                Ok(sink) => {
                                    sink.set_volume(volume);
                                    sink.append(clip.to_source());
                                    sinks.insert(clip.cue, sink);
                                }
                                Err(e) => tracing::warn!("Failed to play {}: {}", clip.cue, e),
                            }
                        }
                    }
                }
            });

        let available = match spawned {
            Ok(_) => ready_rx.recv().unwrap_or(false),
            Err(e) => {
                tracing::warn!("Failed to spawn audio output thread: {}", e);
                false
            }
        };

        Self { tx, available }
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CueBackend for RodioBackend {
    fn is_available(&self) -> bool {
        self.available
    }

    fn load(&self, cue: Cue, path: &Path) -> Result<LoadedClip, AudioError> {
        let file = File::open(path)
            .map_err(|_| AudioError::SoundNotFound(path.display().to_string()))?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::LoadFailed {
            cue,
            reason: e.to_string(),
        })?;

        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<i16> = decoder.collect();

        Ok(LoadedClip::from_samples(cue, channels, sample_rate, samples))
    }

    fn play(&self, clip: &LoadedClip, volume: f32) -> Result<(), AudioError> {
        if !self.available {
            return Err(AudioError::DeviceNotAvailable);
        }
        self.tx
            .send(OutputCommand::Play {
                clip: clip.clone(),
                volume,
            })
            .map_err(|e| AudioError::PlaybackFailed(e.to_string()))
    }
}

/// Backend for hosts without audio support.
#[derive(Debug, Default)]
pub struct SilentBackend;

impl CueBackend for SilentBackend {
    fn is_available(&self) -> bool {
        false
    }

    fn load(&self, _cue: Cue, _path: &Path) -> Result<LoadedClip, AudioError> {
        Err(AudioError::DeviceNotAvailable)
    }

    fn play(&self, _clip: &LoadedClip, _volume: f32) -> Result<(), AudioError> {
        Err(AudioError::DeviceNotAvailable)
    }
}

/// Mock backend for testing.
///
/// Cues load as silent clips with configured durations and every play is
/// recorded.
#[derive(Debug, Default)]
pub struct MockCueBackend {
    durations: Mutex<HashMap<Cue, Duration>>,
    failing: Mutex<Vec<Cue>>,
    plays: Mutex<Vec<Cue>>,
    should_fail_play: AtomicBool,
}

impl MockCueBackend {
    /// All cues load with a one second duration.
    pub fn new() -> Self {
        let backend = Self::default();
        for cue in Cue::ALL {
            backend.set_duration(cue, Duration::from_secs(1));
        }
        backend
    }

    pub fn set_duration(&self, cue: Cue, duration: Duration) {
        self.durations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cue, duration);
    }

    /// Make loading this cue fail.
    pub fn fail_load(&self, cue: Cue) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cue);
    }

    pub fn set_should_fail_play(&self, fail: bool) {
        self.should_fail_play.store(fail, Ordering::SeqCst);
    }

    /// Cues played so far, in order.
    pub fn plays(&self) -> Vec<Cue> {
        self.plays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn play_count(&self, cue: Cue) -> usize {
        self.plays().iter().filter(|&&c| c == cue).count()
    }

    pub fn clear_plays(&self) {
        self.plays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl CueBackend for MockCueBackend {
    fn is_available(&self) -> bool {
        true
    }

    fn load(&self, cue: Cue, path: &Path) -> Result<LoadedClip, AudioError> {
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&cue);
        if failing {
            return Err(AudioError::SoundNotFound(path.display().to_string()));
        }

        let duration = self
            .durations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&cue)
            .copied()
            .unwrap_or_default();
        Ok(LoadedClip::silent(cue, duration))
    }

    fn play(&self, clip: &LoadedClip, _volume: f32) -> Result<(), AudioError> {
        if self.should_fail_play.load(Ordering::SeqCst) {
            return Err(AudioError::PlaybackFailed("Mock failure".to_string()));
        }
        self.plays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(clip.cue);
        Ok(())
    }
}
