//! Sound playback system for the Pomodoro timer.
//!
//! This module provides the audio collaborator of the timer:
//!
//! - Start/end cues from macOS system sounds, with synthesized fallbacks
//! - A looping ambient tick while working
//! - Mute, per-sound switches and volumes from [`AudioSettings`]
//! - Non-blocking playback through rodio
//! - [`AudioCueListener`], which maps timer events to cues
//! - [`AudioController`], which persists settings and pushes them to the player
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │ AudioCueListener │────▶│   SoundPlayer    │ ← trait
//! └──────────────────┘     └────────┬─────────┘
//! ┌──────────────────┐              │
//! │ AudioController  │──────────────┤ apply_settings
//! └──────────────────┘              │
//!                                   │
//!                                   ▼
//!                          ┌──────────────────┐     ┌──────────────────┐
//!                          │ RodioSoundPlayer │────▶│  System Sounds   │
//!                          │                  │     ├──────────────────┤
//!                          │                  │────▶│ Synthesized Tone │
//!                          └──────────────────┘     └──────────────────┘
//! ```

mod controller;
mod error;
mod listener;
mod player;
mod source;

pub use controller::AudioController;
pub use error::SoundError;
pub use listener::AudioCueListener;
pub use player::{try_create_player, RodioSoundPlayer};
pub use source::{
    discover_system_sounds, find_system_sound, resolve_cue, SoundCue, SoundSource, Tone,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::types::AudioSettings;

/// Audio capability consumed by the audio listener.
///
/// Every call returns immediately; sounds play in the background.
pub trait SoundPlayer {
    /// Plays the work-start cue.
    fn play_start(&self) -> Result<(), SoundError>;

    /// Plays the phase-end cue.
    fn play_end(&self) -> Result<(), SoundError>;

    /// Starts the ambient loop. No-op if already playing.
    fn start_ambient(&self) -> Result<(), SoundError>;

    /// Stops the ambient loop. No-op if not playing.
    fn stop_ambient(&self) -> Result<(), SoundError>;

    /// Replaces the settings later sounds are played with.
    ///
    /// A running ambient loop follows the new settings right away.
    fn apply_settings(&self, settings: &AudioSettings) -> Result<(), SoundError>;
}

impl<T: SoundPlayer + ?Sized> SoundPlayer for Arc<T> {
    fn play_start(&self) -> Result<(), SoundError> {
        (**self).play_start()
    }

    fn play_end(&self) -> Result<(), SoundError> {
        (**self).play_end()
    }

    fn start_ambient(&self) -> Result<(), SoundError> {
        (**self).start_ambient()
    }

    fn stop_ambient(&self) -> Result<(), SoundError> {
        (**self).stop_ambient()
    }

    fn apply_settings(&self, settings: &AudioSettings) -> Result<(), SoundError> {
        (**self).apply_settings(settings)
    }
}

/// A call recorded by [`MockSoundPlayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCall {
    PlayStart,
    PlayEnd,
    StartAmbient,
    StopAmbient,
}

/// Mock sound player for testing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    calls: Mutex<Vec<SoundCall>>,
    applied: Mutex<Vec<AudioSettings>>,
    should_fail: AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<SoundCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Settings passed to `apply_settings`, in order.
    #[must_use]
    pub fn applied_settings(&self) -> Vec<AudioSettings> {
        self.applied.lock().unwrap().clone()
    }

    fn record(&self, call: SoundCall) -> Result<(), SoundError> {
        self.calls.lock().unwrap().push(call);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        Ok(())
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play_start(&self) -> Result<(), SoundError> {
        self.record(SoundCall::PlayStart)
    }

    fn play_end(&self) -> Result<(), SoundError> {
        self.record(SoundCall::PlayEnd)
    }

    fn start_ambient(&self) -> Result<(), SoundError> {
        self.record(SoundCall::StartAmbient)
    }

    fn stop_ambient(&self) -> Result<(), SoundError> {
        self.record(SoundCall::StopAmbient)
    }

    fn apply_settings(&self, settings: &AudioSettings) -> Result<(), SoundError> {
        self.applied.lock().unwrap().push(*settings);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        Ok(())
    }
}
