//! Sound source management.
//!
//! Cues are played from macOS system sounds when they exist and from
//! synthesized tones otherwise. The ambient tick is always synthesized.

use std::path::PathBuf;
use std::time::Duration;

use crate::types::AudioSettings;

use super::error::SoundError;

/// Which moment of the timer a sound marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// A work phase begins
    Start,
    /// Any phase completes
    End,
    /// Background tick while working
    Ambient,
}

impl SoundCue {
    /// Preferred system sound for this cue, if any.
    pub fn system_sound_name(&self) -> Option<&'static str> {
        match self {
            SoundCue::Start => Some("Tink"),
            SoundCue::End => Some("Glass"),
            SoundCue::Ambient => None,
        }
    }

    /// Volume this cue plays at under `settings`; zero means silent.
    pub fn volume_in(&self, settings: &AudioSettings) -> f32 {
        match self {
            SoundCue::Start => settings.effective_start_volume(),
            SoundCue::End => settings.effective_end_volume(),
            SoundCue::Ambient => settings.effective_ticking_volume(),
        }
    }

    /// Synthesized fallback for this cue.
    pub fn tone(&self) -> Tone {
        match self {
            SoundCue::Start => Tone::Chime,
            SoundCue::End => Tone::Bell,
            SoundCue::Ambient => Tone::Tick,
        }
    }
}

/// A synthesized sound made of sine segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Two rising notes
    Chime,
    /// Three falling notes
    Bell,
    /// One short click per second
    Tick,
}

impl Tone {
    /// Frequency (Hz) and length of each segment, played in order.
    pub fn segments(&self) -> &'static [(f32, Duration)] {
        const CHIME: &[(f32, Duration)] = &[
            (660.0, Duration::from_millis(120)),
            (990.0, Duration::from_millis(220)),
        ];
        const BELL: &[(f32, Duration)] = &[
            (1046.5, Duration::from_millis(180)),
            (784.0, Duration::from_millis(180)),
            (523.25, Duration::from_millis(360)),
        ];
        const TICK: &[(f32, Duration)] = &[(1200.0, Duration::from_millis(25))];

        match self {
            Tone::Chime => CHIME,
            Tone::Bell => BELL,
            Tone::Tick => TICK,
        }
    }

    /// Output gain.
    pub fn volume(&self) -> f32 {
        match self {
            Tone::Chime | Tone::Bell => 0.25,
            Tone::Tick => 0.08,
        }
    }

    /// Silence before each repetition when looped.
    pub fn loop_gap(&self) -> Duration {
        Duration::from_secs(1).saturating_sub(self.total_length())
    }

    /// Sum of all segment lengths.
    pub fn total_length(&self) -> Duration {
        self.segments().iter().map(|(_, length)| *length).sum()
    }

    fn name(&self) -> &'static str {
        match self {
            Tone::Chime => "chime",
            Tone::Bell => "bell",
            Tone::Tick => "tick",
        }
    }
}

/// Represents the source of a sound to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// A macOS system sound from `/System/Library/Sounds/` or similar.
    System {
        /// The name of the sound (e.g., "Glass").
        name: String,
        /// The full path to the sound file.
        path: PathBuf,
        /// Tone played if the file cannot be decoded.
        fallback: Tone,
    },
    /// A synthesized tone.
    Tone(Tone),
}

impl SoundSource {
    /// Creates a system sound source with a synthesized fallback.
    #[must_use]
    pub fn system(name: impl Into<String>, path: impl Into<PathBuf>, fallback: Tone) -> Self {
        Self::System {
            name: name.into(),
            path: path.into(),
            fallback,
        }
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::System { name, .. } => name,
            Self::Tone(tone) => tone.name(),
        }
    }

    /// Returns true if this is a system sound.
    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }

    /// Returns the tone played for this source when no file is usable.
    #[must_use]
    pub fn fallback_tone(&self) -> Tone {
        match self {
            Self::System { fallback, .. } => *fallback,
            Self::Tone(tone) => *tone,
        }
    }
}

/// Directories to search for system sounds, in order of priority.
const SYSTEM_SOUND_DIRS: &[&str] = &["/System/Library/Sounds", "/Library/Sounds"];

/// Supported audio file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &["aiff", "wav", "mp3", "m4a", "flac"];

/// Discovers available system sounds as `(name, path)` pairs.
///
/// Returns an empty vector if no sounds are found.
#[must_use]
pub fn discover_system_sounds() -> Vec<(String, PathBuf)> {
    let mut sounds = Vec::new();

    for dir in SYSTEM_SOUND_DIRS {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };

        for entry in entries.flatten() {
            let file_path = entry.path();
            let supported = file_path
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()));
            if !supported {
                continue;
            }
            if let Some(stem) = file_path.file_stem() {
                sounds.push((stem.to_string_lossy().into_owned(), file_path));
            }
        }
    }

    sounds.sort_by(|a, b| a.0.cmp(&b.0));
    sounds
}

/// Finds a system sound by name.
///
/// # Errors
///
/// Returns `SoundError::FileNotFound` if no sound with the given name exists.
pub fn find_system_sound(name: &str) -> Result<(String, PathBuf), SoundError> {
    discover_system_sounds()
        .into_iter()
        .find(|(found, _)| found.eq_ignore_ascii_case(name))
        .ok_or_else(|| SoundError::FileNotFound(format!("System sound '{}' not found", name)))
}

/// Resolves the source played for a cue.
#[must_use]
pub fn resolve_cue(cue: SoundCue) -> SoundSource {
    let tone = cue.tone();
    cue.system_sound_name()
        .and_then(|name| find_system_sound(name).ok())
        .map(|(name, path)| SoundSource::system(name, path, tone))
        .unwrap_or(SoundSource::Tone(tone))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_source_system() {
        let source = SoundSource::system("Glass", "/System/Library/Sounds/Glass.aiff", Tone::Bell);
        assert!(source.is_system());
        assert_eq!(source.name(), "Glass");
        assert_eq!(source.fallback_tone(), Tone::Bell);
    }

    #[test]
    fn test_sound_source_tone() {
        let source = SoundSource::Tone(Tone::Chime);
        assert!(!source.is_system());
        assert_eq!(source.name(), "chime");
        assert_eq!(source.fallback_tone(), Tone::Chime);
    }

    #[test]
    fn test_cue_mapping() {
        assert_eq!(SoundCue::Start.system_sound_name(), Some("Tink"));
        assert_eq!(SoundCue::End.system_sound_name(), Some("Glass"));
        assert_eq!(SoundCue::Ambient.system_sound_name(), None);
        assert_eq!(SoundCue::Ambient.tone(), Tone::Tick);
    }

    #[test]
    fn test_cue_volume_follows_settings() {
        let settings = AudioSettings {
            start_volume: 0.4,
            ticking: false,
            ..AudioSettings::default()
        };
        assert_eq!(SoundCue::Start.volume_in(&settings), 0.4);
        assert_eq!(SoundCue::End.volume_in(&settings), 1.0);
        assert_eq!(SoundCue::Ambient.volume_in(&settings), 0.0);
    }

    #[test]
    fn test_ambient_always_synthesized() {
        assert_eq!(resolve_cue(SoundCue::Ambient), SoundSource::Tone(Tone::Tick));
    }

    #[test]
    fn test_resolve_cue_keeps_tone_fallback() {
        // System sounds may or may not exist on the test host
        let source = resolve_cue(SoundCue::End);
        assert_eq!(source.fallback_tone(), Tone::Bell);
    }

    #[test]
    fn test_tick_loops_once_per_second() {
        let tick = Tone::Tick;
        assert_eq!(tick.total_length() + tick.loop_gap(), Duration::from_secs(1));
    }

    #[test]
    fn test_tones_are_audible_length() {
        for tone in [Tone::Chime, Tone::Bell, Tone::Tick] {
            assert!(!tone.segments().is_empty());
            assert!(tone.total_length() < Duration::from_secs(1));
            assert!(tone.volume() > 0.0 && tone.volume() <= 1.0);
        }
    }

    #[test]
    fn test_find_system_sound_not_found() {
        let result = find_system_sound("NonExistentSound12345");
        match result {
            Err(SoundError::FileNotFound(msg)) => assert!(msg.contains("NonExistentSound12345")),
            other => panic!("Expected FileNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_discover_system_sounds_no_panic() {
        let _ = discover_system_sounds();
    }
}
