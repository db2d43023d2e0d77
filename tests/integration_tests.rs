//! Integration tests for Daemon-CLI IPC communication.
//!
//! These tests drive a real `IpcServer` and the CLI `IpcClient` over a
//! Unix socket, with the engine answering requests the way the daemon
//! loop does:
//! - Timer operations via IPC
//! - Status query via IPC
//! - Configuration updates via IPC
//! - Connection error handling

use std::future::Future;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use pomobar::cli::client::IpcClient;
use pomobar::daemon::ipc::{IpcCall, IpcServer, RequestHandler};
use pomobar::daemon::{EventBus, ManualScheduler, TimerEngine};
use pomobar::settings::{ConfigStore, MemoryStore};
use pomobar::types::{ConfigParams, TimerConfiguration, TimerPhase, TimerState};

type Engine = TimerEngine<ManualScheduler>;

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates a temporary socket path for testing.
fn create_temp_socket_path() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("integration_test.sock");
    (dir, path)
}

/// Creates an idle engine backed by `store`.
fn create_engine(store: MemoryStore) -> Engine {
    TimerEngine::new(
        ManualScheduler::new(),
        Box::new(store),
        Box::new(EventBus::new()),
    )
}

/// Serves IPC calls against `engine` until `client_side` finishes.
async fn with_daemon<F, Fut, T>(engine: &mut Engine, client_side: F) -> T
where
    F: FnOnce(IpcClient) -> Fut,
    Fut: Future<Output = T>,
{
    let (_dir, socket_path) = create_temp_socket_path();
    let server = IpcServer::new(&socket_path).unwrap();
    let (calls_tx, mut calls) = mpsc::channel::<IpcCall>(8);
    let server_task = tokio::spawn(server.serve(calls_tx));

    let client_future = client_side(IpcClient::with_socket_path(socket_path));
    tokio::pin!(client_future);

    let output = timeout(Duration::from_secs(10), async {
        loop {
            tokio::select! {
                output = &mut client_future => break output,
                Some(call) = calls.recv() => {
                    let response = RequestHandler::new(engine).handle(call.request);
                    let _ = call.reply.send(response);
                }
            }
        }
    })
    .await
    .expect("client side did not finish");

    server_task.abort();
    output
}

// ============================================================================
// Timer Operations via IPC
// ============================================================================

#[tokio::test]
async fn test_timer_start_via_ipc() {
    let mut engine = create_engine(MemoryStore::new());

    let response = with_daemon(&mut engine, |client| async move { client.start().await }).await;

    let response = response.expect("Expected successful response");
    assert!(response.is_success());
    assert_eq!(response.message, "Focus started");

    let data = response.data.expect("Response should contain data");
    assert_eq!(data.state.as_deref(), Some("running"));
    assert_eq!(data.phase.as_deref(), Some("work"));
    assert_eq!(data.remaining_seconds, Some(25 * 60));
    assert_eq!(data.formatted_time.as_deref(), Some("25:00"));

    assert_eq!(engine.state(), TimerState::Running);
}

#[tokio::test]
async fn test_pause_and_resume_via_ipc() {
    let mut engine = create_engine(MemoryStore::new());
    engine.start();
    engine.advance(Duration::from_secs(300));

    let (paused, resumed) = with_daemon(&mut engine, |client| async move {
        let paused = client.pause().await.unwrap();
        let resumed = client.start().await.unwrap();
        (paused, resumed)
    })
    .await;

    assert_eq!(paused.message, "Timer paused");
    let data = paused.data.unwrap();
    assert_eq!(data.state.as_deref(), Some("paused"));
    assert_eq!(data.remaining_seconds, Some(20 * 60));

    assert_eq!(resumed.message, "Timer resumed");
    assert_eq!(resumed.data.unwrap().remaining_seconds, Some(20 * 60));
    assert_eq!(engine.state(), TimerState::Running);
}

#[tokio::test]
async fn test_toggle_via_ipc() {
    let mut engine = create_engine(MemoryStore::new());

    let messages = with_daemon(&mut engine, |client| async move {
        let mut messages = Vec::new();
        for _ in 0..3 {
            messages.push(client.toggle().await.unwrap().message);
        }
        messages
    })
    .await;

    assert_eq!(messages, vec!["Focus started", "Timer paused", "Timer resumed"]);
    assert_eq!(engine.state(), TimerState::Running);
}

#[tokio::test]
async fn test_skip_and_reset_via_ipc() {
    let mut engine = create_engine(MemoryStore::new());

    let (skipped, reset) = with_daemon(&mut engine, |client| async move {
        client.start().await.unwrap();
        let skipped = client.skip().await.unwrap();
        let reset = client.reset().await.unwrap();
        (skipped, reset)
    })
    .await;

    assert_eq!(skipped.message, "Phase skipped");
    let data = skipped.data.unwrap();
    assert_eq!(data.phase.as_deref(), Some("short_break"));
    assert_eq!(data.state.as_deref(), Some("idle"));
    assert_eq!(data.completed_cycles, Some(1));

    assert_eq!(reset.message, "Timer reset");
    assert_eq!(engine.phase(), TimerPhase::Work);
    assert_eq!(engine.completed_cycles(), 0);
}

#[tokio::test]
async fn test_stop_via_ipc_rewinds_phase() {
    let mut engine = create_engine(MemoryStore::new());
    engine.start();
    engine.advance(Duration::from_secs(90));

    let response = with_daemon(&mut engine, |client| async move { client.stop().await }).await;

    let data = response.unwrap().data.unwrap();
    assert_eq!(data.state.as_deref(), Some("idle"));
    assert_eq!(data.remaining_seconds, Some(25 * 60));
}

// ============================================================================
// Rejected Operations
// ============================================================================

#[tokio::test]
async fn test_no_op_operations_are_errors() {
    let mut engine = create_engine(MemoryStore::new());

    let errors = with_daemon(&mut engine, |client| async move {
        vec![
            client.pause().await.unwrap_err().to_string(),
            client.stop().await.unwrap_err().to_string(),
            client.skip().await.unwrap_err().to_string(),
        ]
    })
    .await;

    assert_eq!(
        errors,
        vec![
            "Timer is not running",
            "Timer is already stopped",
            "Nothing to skip; start the timer first",
        ]
    );
    assert_eq!(engine.state(), TimerState::Idle);
}

#[tokio::test]
async fn test_start_while_running_is_error() {
    let mut engine = create_engine(MemoryStore::new());
    engine.start();

    let result = with_daemon(&mut engine, |client| async move { client.start().await }).await;

    assert!(result.unwrap_err().to_string().contains("already running"));
}

// ============================================================================
// Status Query via IPC
// ============================================================================

#[tokio::test]
async fn test_status_query_via_ipc() {
    let mut engine = create_engine(MemoryStore::new());
    engine.start();
    engine.advance(Duration::from_millis(1_500));

    let response = with_daemon(&mut engine, |client| async move { client.status().await }).await;

    let data = response.unwrap().data.unwrap();
    assert_eq!(data.state.as_deref(), Some("running"));
    assert_eq!(data.remaining_seconds, Some(1498));
    assert_eq!(data.formatted_time.as_deref(), Some("24:58"));
    assert_eq!(data.completed_cycles, Some(0));
    assert_eq!(data.configuration, Some(TimerConfiguration::default()));
    let progress = data.progress.unwrap();
    assert!(progress > 0.0 && progress < 0.01, "progress = {}", progress);
}

// ============================================================================
// Configuration via IPC
// ============================================================================

#[tokio::test]
async fn test_configure_via_ipc_persists() {
    let store = MemoryStore::new();
    let mut engine = create_engine(store.clone());

    let params = ConfigParams {
        work_duration: Some(50 * 60),
        cycles_before_long_break: Some(2),
        show_time_in_menu_bar: Some(false),
        ..ConfigParams::default()
    };
    let response = with_daemon(&mut engine, |client| async move {
        client.configure(params).await
    })
    .await;

    let response = response.unwrap();
    assert_eq!(response.message, "Configuration updated");
    assert_eq!(response.data.unwrap().remaining_seconds, Some(3000));

    let stored = store.load();
    assert_eq!(stored.work_duration, 3000);
    assert_eq!(stored.cycles_before_long_break, 2);
    assert!(!stored.show_time_in_menu_bar);
    assert_eq!(stored.short_break_duration, 300);
}

#[tokio::test]
async fn test_configure_out_of_range_is_rejected() {
    let store = MemoryStore::new();
    let mut engine = create_engine(store.clone());

    let params = ConfigParams {
        work_duration: Some(30),
        ..ConfigParams::default()
    };
    let result = with_daemon(&mut engine, |client| async move {
        client.configure(params).await
    })
    .await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("work duration"), "got: {}", message);
    assert_eq!(engine.configuration(), &TimerConfiguration::default());
}

#[tokio::test]
async fn test_configure_without_values_is_rejected() {
    let mut engine = create_engine(MemoryStore::new());

    let result = with_daemon(&mut engine, |client| async move {
        client.configure(ConfigParams::default()).await
    })
    .await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "No configuration values given"
    );
}

// ============================================================================
// Connection Error Handling
// ============================================================================

#[tokio::test]
async fn test_connection_error_without_daemon() {
    let (_dir, socket_path) = create_temp_socket_path();
    let client = IpcClient::with_socket_path(socket_path);

    let result = client.status().await;

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("Is 'pomobar daemon' running?"), "got: {}", message);
}

#[tokio::test]
async fn test_sequential_clients() {
    let mut engine = create_engine(MemoryStore::new());

    let states = with_daemon(&mut engine, |client| async move {
        let mut states = Vec::new();
        for _ in 0..5 {
            let other = IpcClient::with_socket_path(client.socket_path().to_path_buf());
            let data = other.status().await.unwrap().data.unwrap();
            states.push(data.state.unwrap());
        }
        states
    })
    .await;

    assert_eq!(states, vec!["idle"; 5]);
}
