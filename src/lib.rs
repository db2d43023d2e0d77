//! Pomobar Library
//!
//! This library provides the core functionality of the Pomobar menu bar timer.
//! It includes:
//! - Timer engine with an injectable scheduler and an event protocol
//! - Persisted timer configuration and audio settings
//! - Audio cues, system notifications with action buttons and the menu bar display
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities

pub mod cli;
pub mod daemon;
pub mod menubar;
pub mod notification;
pub mod settings;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    AudioParams, AudioSettings, ConfigError, ConfigParams, IpcRequest, IpcResponse, ResponseData, TimerConfiguration,
    TimerPhase, TimerSnapshot, TimerState,
};

pub use daemon::{
    EventBus, EventSink, ListenerError, ManualScheduler, Scheduler, TimerEngine, TimerEvent,
    TimerListener, TokioScheduler,
};

pub use settings::{AudioSettingsStore, ConfigStore, JsonFileStore, KeyValueStore, MemoryStore, SettingsError};

pub use notification::{
    MockNotifier, NotificationAction, NotificationError, NotificationListener,
    NotificationResponse, Notifier,
};

pub use menubar::{
    DisplayListener, DisplaySink, EventHandler, IconManager, MenuAction, MenuBuilder, MenuConfig,
    RecordingDisplay, TrayIconManager, TrayUpdate,
};

pub use sound::{AudioController, AudioCueListener, MockSoundPlayer, SoundCue, SoundError, SoundPlayer};
