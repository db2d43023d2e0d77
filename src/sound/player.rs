//! Sound player implementation using rodio.
//!
//! Cues are fire-and-forget: each one gets its own detached sink. The ambient
//! tick keeps a sink so it can be stopped or re-leveled.
//!
//! Every sound is played at the volume the current [`AudioSettings`] give
//! it. A sound whose volume is zero (muted or switched off) is skipped.

use std::fs::File;
use std::io::BufReader;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use rodio::source::{SineWave, Source};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use crate::types::AudioSettings;

use super::error::SoundError;
use super::source::{resolve_cue, SoundCue, SoundSource, Tone};
use super::SoundPlayer;

/// A sound player that uses rodio for audio playback.
pub struct RodioSoundPlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
    settings: Mutex<AudioSettings>,
    start_sound: SoundSource,
    end_sound: SoundSource,
    /// Sink of the running ambient loop
    ambient: Mutex<Option<Sink>>,
    /// Set between `start_ambient` and `stop_ambient`, even while silent
    ambient_requested: AtomicBool,
}

impl RodioSoundPlayer {
    /// Creates a new sound player.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new(settings: AudioSettings) -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        let start_sound = resolve_cue(SoundCue::Start);
        let end_sound = resolve_cue(SoundCue::End);
        debug!(
            start = start_sound.name(),
            end = end_sound.name(),
            muted = settings.muted,
            "Audio output stream initialized"
        );

        Ok(Self {
            _stream: stream,
            stream_handle,
            settings: Mutex::new(settings),
            start_sound,
            end_sound,
            ambient: Mutex::new(None),
            ambient_requested: AtomicBool::new(false),
        })
    }

    /// Returns the settings sounds are currently played with.
    #[must_use]
    pub fn settings(&self) -> AudioSettings {
        self.settings.lock().map(|s| *s).unwrap_or_default()
    }

    /// Plays a sound from the given source at `volume` without blocking.
    ///
    /// Nothing is played at volume zero. A system sound that cannot be
    /// opened or decoded falls back to its synthesized tone.
    ///
    /// # Errors
    ///
    /// Returns an error if no sink can be created.
    pub fn play(&self, source: &SoundSource, volume: f32) -> Result<(), SoundError> {
        if volume <= 0.0 {
            debug!(sound = source.name(), "Sound silenced by settings, skipping");
            return Ok(());
        }

        match source {
            SoundSource::System { path, name, fallback } => {
                debug!(sound = %name, volume, "Playing system sound");
                match self.play_file(path, volume) {
                    Ok(()) => Ok(()),
                    Err(e) if e.should_fallback_to_tone() => {
                        warn!(sound = %name, error = %e, "Falling back to synthesized tone");
                        self.play_tone(*fallback, volume)
                    }
                    Err(e) => Err(e),
                }
            }
            SoundSource::Tone(tone) => self.play_tone(*tone, volume),
        }
    }

    fn play_cue(&self, source: &SoundSource, cue: SoundCue) -> Result<(), SoundError> {
        let volume = cue.volume_in(&self.settings());
        self.play(source, volume)
    }

    fn play_file(&self, path: &std::path::Path, volume: f32) -> Result<(), SoundError> {
        let file = File::open(path)
            .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;

        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| SoundError::DecodeError(e.to_string()))?;

        let sink = self.new_sink()?;
        sink.set_volume(volume);
        sink.append(decoder);
        sink.detach();
        Ok(())
    }

    fn play_tone(&self, tone: Tone, volume: f32) -> Result<(), SoundError> {
        let sink = self.new_sink()?;
        sink.set_volume(volume);
        for (frequency, length) in tone.segments() {
            sink.append(
                SineWave::new(*frequency)
                    .take_duration(*length)
                    .amplify(tone.volume()),
            );
        }
        sink.detach();
        debug!(?tone, volume, "Tone playback started (detached)");
        Ok(())
    }

    fn new_sink(&self) -> Result<Sink, SoundError> {
        Sink::try_new(&self.stream_handle).map_err(|e| SoundError::StreamError(e.to_string()))
    }

    fn lock_ambient(&self) -> Result<MutexGuard<'_, Option<Sink>>, SoundError> {
        self.ambient
            .lock()
            .map_err(|_| SoundError::PlaybackError("ambient sink lock poisoned".to_string()))
    }

    /// Brings the ambient loop in line with `volume`: started, re-leveled
    /// or silenced.
    fn level_ambient(&self, volume: f32) -> Result<(), SoundError> {
        let mut ambient = self.lock_ambient()?;

        if volume <= 0.0 {
            if let Some(sink) = ambient.take() {
                sink.stop();
                debug!("Ambient tick silenced");
            }
            return Ok(());
        }

        if let Some(sink) = ambient.as_ref() {
            sink.set_volume(volume);
            return Ok(());
        }

        let tick = Tone::Tick;
        let (frequency, length) = tick.segments()[0];
        let sink = self.new_sink()?;
        sink.set_volume(volume);
        sink.append(
            SineWave::new(frequency)
                .take_duration(length)
                .amplify(tick.volume())
                .delay(tick.loop_gap())
                .repeat_infinite(),
        );
        *ambient = Some(sink);
        debug!(volume, "Ambient tick started");
        Ok(())
    }

    /// Returns true while the ambient loop is audible.
    #[must_use]
    pub fn is_ambient_playing(&self) -> bool {
        self.ambient.lock().map(|a| a.is_some()).unwrap_or(false)
    }
}

impl SoundPlayer for RodioSoundPlayer {
    fn play_start(&self) -> Result<(), SoundError> {
        self.play_cue(&self.start_sound, SoundCue::Start)
    }

    fn play_end(&self) -> Result<(), SoundError> {
        self.play_cue(&self.end_sound, SoundCue::End)
    }

    fn start_ambient(&self) -> Result<(), SoundError> {
        self.ambient_requested.store(true, Ordering::Relaxed);
        self.level_ambient(SoundCue::Ambient.volume_in(&self.settings()))
    }

    fn stop_ambient(&self) -> Result<(), SoundError> {
        self.ambient_requested.store(false, Ordering::Relaxed);
        if let Some(sink) = self.lock_ambient()?.take() {
            sink.stop();
            debug!("Ambient tick stopped");
        }
        Ok(())
    }

    fn apply_settings(&self, settings: &AudioSettings) -> Result<(), SoundError> {
        {
            let mut current = self
                .settings
                .lock()
                .map_err(|_| SoundError::PlaybackError("settings lock poisoned".to_string()))?;
            *current = *settings;
        }
        debug!(?settings, "Audio settings applied");

        if self.ambient_requested.load(Ordering::Relaxed) {
            self.level_ambient(SoundCue::Ambient.volume_in(settings))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer")
            .field("settings", &self.settings())
            .field("start_sound", &self.start_sound.name())
            .field("end_sound", &self.end_sound.name())
            .finish_non_exhaustive()
    }
}

/// Creates a sound player, returning None if audio is unavailable.
///
/// If audio initialization fails, a warning is logged and None is returned.
#[must_use]
pub fn try_create_player(settings: AudioSettings) -> Option<RodioSoundPlayer> {
    match RodioSoundPlayer::new(settings) {
        Ok(player) => Some(player),
        Err(e) => {
            warn!(error = %e, "Audio not available, sound disabled");
            None
        }
    }
}
