//! Maps timer events to audio cues.

use crate::daemon::event::{ListenerError, TimerEvent, TimerListener};
use crate::types::{TimerPhase, TimerSnapshot};

use super::SoundPlayer;

/// Plays the start cue and ambient tick for work, the end cue on completion.
pub struct AudioCueListener<P: SoundPlayer> {
    player: P,
}

impl<P: SoundPlayer> AudioCueListener<P> {
    pub fn new(player: P) -> Self {
        Self { player }
    }
}

impl<P: SoundPlayer> TimerListener for AudioCueListener<P> {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn on_event(&mut self, event: &TimerEvent, _snapshot: &TimerSnapshot) -> Result<(), ListenerError> {
        // Both calls always run; the first error is reported.
        match event {
            TimerEvent::PhaseStarted {
                phase: TimerPhase::Work,
            } => {
                let cue = self.player.play_start();
                let ambient = self.player.start_ambient();
                cue.and(ambient)?;
            }
            TimerEvent::Resumed {
                phase: TimerPhase::Work,
            } => self.player.start_ambient()?,
            TimerEvent::PhaseStarted { .. } | TimerEvent::Paused | TimerEvent::Stopped => {
                self.player.stop_ambient()?
            }
            TimerEvent::PhaseCompleted { .. } => {
                let cue = self.player.play_end();
                let ambient = self.player.stop_ambient();
                cue.and(ambient)?;
            }
            TimerEvent::Resumed { .. }
            | TimerEvent::Tick { .. }
            | TimerEvent::StateChanged { .. }
            | TimerEvent::ConfigurationChanged => {}
        }
        Ok(())
    }
}
