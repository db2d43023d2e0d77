//! Daemon module for the Pomodoro timer.
//!
//! This module contains the core daemon functionality:
//! - `scheduler`: Injectable wakeup scheduling (tokio-backed and manual)
//! - `event`: Timer events, sinks and the failure-isolating event bus
//! - `timer`: Timer engine with phase transitions and countdown logic
//! - `ipc`: Unix socket server and request handling
//!
//! [`run`] is the composition root: it builds the settings store, the
//! listeners, the engine, the IPC server and the tray, then drives all of
//! them from one loop on the current thread.

pub mod event;
pub mod ipc;
pub mod scheduler;
pub mod timer;

pub use event::{EventBus, EventSink, ListenerError, TimerEvent, TimerListener, TimerNotice};
pub use ipc::{IpcCall, IpcServer, RequestHandler};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler, Wakeup};
pub use timer::TimerEngine;

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::menubar::{
    DisplayListener, EventHandler, IconManager, MenuAction, MenuBuilder, TrayIconManager,
};
use crate::notification::{NotificationAction, NotificationListener, NotificationResponse};
use crate::settings::JsonFileStore;
use crate::sound::{try_create_player, AudioController, AudioCueListener, SoundPlayer};

/// How often pending tray updates, menu clicks and notification clicks are
/// handled.
const UI_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Capacity of the IPC request queue.
const IPC_QUEUE_SIZE: usize = 16;

/// Process options of the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonOptions {
    /// Unix socket the IPC server binds to
    pub socket_path: PathBuf,
    /// JSON settings file holding the configuration and audio settings
    pub settings_path: PathBuf,
    /// Play audio cues
    pub sound: bool,
    /// Post system notifications
    pub notifications: bool,
    /// Show the menu bar icon
    pub tray: bool,
}

/// Runs the daemon until Ctrl+C or the Quit menu item.
///
/// # Errors
///
/// Returns an error if the IPC socket cannot be bound.
pub async fn run(options: DaemonOptions) -> Result<()> {
    info!(socket = %options.socket_path.display(), "Starting daemon");

    let mut bus = EventBus::new();
    let mut audio = AudioController::new(Box::new(JsonFileStore::new(&options.settings_path)));

    if options.sound {
        match try_create_player(*audio.settings()) {
            Some(player) => {
                let player: Arc<dyn SoundPlayer> = Arc::new(player);
                audio.attach_player(Arc::clone(&player));
                bus.subscribe(Box::new(AudioCueListener::new(player)));
            }
            None => info!("Continuing without sound"),
        }
    }

    let (responses_tx, responses) = crossbeam_channel::unbounded::<NotificationResponse>();
    let actions = if options.notifications {
        subscribe_notifications(&mut bus, responses_tx).await
    } else {
        None
    };

    let mut tray = if options.tray {
        let (tx, rx) = crossbeam_channel::unbounded();
        bus.subscribe(Box::new(DisplayListener::new(tx)));
        Some(TrayIconManager::new(rx))
    } else {
        None
    };

    debug!(listeners = ?bus.listener_names(), "Event bus ready");

    let store = JsonFileStore::new(&options.settings_path);
    let mut engine = TimerEngine::new(TokioScheduler::new(), Box::new(store), Box::new(bus));

    if let Some(tray) = tray.as_mut() {
        let snapshot = engine.snapshot();
        let title = IconManager::new().generate_title(&snapshot);
        let menu = MenuBuilder::new().build(&snapshot);
        if let Err(e) = tray.initialize(&title, &menu) {
            warn!(error = %e, "Menu bar unavailable");
        }
    }

    let server = IpcServer::new(&options.socket_path)?;
    let (calls_tx, mut calls) = mpsc::channel::<IpcCall>(IPC_QUEUE_SIZE);
    let server_task = tokio::spawn(server.serve(calls_tx));

    let mut ui_poll = tokio::time::interval(UI_POLL_INTERVAL);
    ui_poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let event_handler = EventHandler::new();

    info!("Daemon ready");

    loop {
        tokio::select! {
            wakeup = engine.scheduler_mut().next_wakeup() => {
                engine.handle_wakeup(wakeup);
            }
            Some(call) = calls.recv() => {
                let response = RequestHandler::new(&mut engine)
                    .with_audio(&mut audio)
                    .handle(call.request);
                if call.reply.send(response).is_err() {
                    debug!("IPC client went away before the reply");
                }
            }
            _ = ui_poll.tick(), if tray.is_some() || actions.is_some() => {
                while let Ok(response) = responses.try_recv() {
                    if let Some(action) = response.action() {
                        apply_notification_action(&mut engine, action);
                    }
                }
                if let Some(tray) = tray.as_mut() {
                    if drive_tray(tray, &mut engine, &event_handler).is_break() {
                        info!("Quit selected from the menu bar");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C");
                break;
            }
        }
    }

    // Silences the ambient loop; not persisted.
    engine.stop();
    if let Some(tray) = tray.as_mut() {
        tray.shutdown();
    }

    drop(calls);
    server_task.abort();
    let _ = server_task.await;

    info!("Daemon stopped");
    Ok(())
}

/// Keeps notification buttons registered while the daemon runs.
#[cfg(target_os = "macos")]
type ActionsGuard = crate::notification::NotificationActions;
#[cfg(not(target_os = "macos"))]
type ActionsGuard = ();

#[cfg(target_os = "macos")]
async fn subscribe_notifications(
    bus: &mut EventBus,
    responses: crossbeam_channel::Sender<NotificationResponse>,
) -> Option<ActionsGuard> {
    let notifier = crate::notification::SystemNotifier::new().await;
    let actions = notifier
        .is_authorized()
        .then(|| crate::notification::NotificationActions::register(responses))
        .flatten();
    bus.subscribe(Box::new(NotificationListener::new(notifier)));
    actions
}

// Logged notifications have no buttons.
#[cfg(not(target_os = "macos"))]
async fn subscribe_notifications(
    bus: &mut EventBus,
    _responses: crossbeam_channel::Sender<NotificationResponse>,
) -> Option<ActionsGuard> {
    bus.subscribe(Box::new(NotificationListener::new(
        crate::notification::LogNotifier,
    )));
    None
}

/// Applies pending display updates, then every menu click.
fn drive_tray<S: Scheduler>(
    tray: &mut TrayIconManager,
    engine: &mut TimerEngine<S>,
    event_handler: &EventHandler,
) -> ControlFlow<()> {
    tray.process_pending_updates();
    while let Some(action) = tray.poll_action() {
        apply_menu_action(engine, action, event_handler)?;
    }
    ControlFlow::Continue(())
}

/// Runs the engine operation behind a menu action.
///
/// Returns `Break` for Quit.
pub fn apply_menu_action<S: Scheduler>(
    engine: &mut TimerEngine<S>,
    action: MenuAction,
    event_handler: &EventHandler,
) -> ControlFlow<()> {
    let applied = match action {
        MenuAction::Toggle => engine.toggle_timer(),
        MenuAction::Skip => engine.skip(),
        MenuAction::Reset => engine.reset(),
        MenuAction::Quit => return ControlFlow::Break(()),
    };
    event_handler.log_action_result(&action, applied);
    ControlFlow::Continue(())
}

/// Runs the engine operation behind a notification button.
pub fn apply_notification_action<S: Scheduler>(
    engine: &mut TimerEngine<S>,
    action: NotificationAction,
) -> bool {
    let applied = match action {
        NotificationAction::StartBreak => engine.phase().is_break() && engine.start(),
        NotificationAction::SkipBreak | NotificationAction::StartWork => engine.start_work(),
    };
    info!(?action, applied, "Notification action");
    applied
}

// ============================================================================
// Tests
// ============================================================================
