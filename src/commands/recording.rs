use crate::core::capture::platform_capability;
use crate::core::hotkeys::HotkeyAction;
use crate::domain::models::{
    AppError, CountdownTickEvent, FinishedRecording, RecordingStatusEvent,
};
use crate::domain::state_machine::SessionState;
use crate::infra::ffmpeg::capture::{
    spawn_capture_process, stop_capture_process, toggle_capture_pause,
};
use crate::infra::ffmpeg::command::{ensure_ffmpeg_available, ffmpeg_bin};
use crate::infra::storage::artifacts::{artifact_len, artifact_path, ensure_recordings_dir};
use crate::state::{ActiveSession, CaptureProcess, RuntimeState};
use chrono::Utc;
use tauri::{AppHandle, Emitter, Manager, State};
use uuid::Uuid;

fn state_lock_error(what: &str) -> AppError {
    AppError::new("STATE_LOCK_ERROR", format!("failed to lock {what}"), None)
}

fn status_event_for(session: &ActiveSession, detail: &str) -> RecordingStatusEvent {
    RecordingStatusEvent {
        session_id: session.session_id.clone(),
        status: session.machine.state().as_status().to_string(),
        duration_secs: session.duration_secs,
        bytes_recorded: session.bytes_recorded,
        mode_label: session.profile.mode.label().to_string(),
        detail: detail.to_string(),
        degrade_message: session.degrade_message.clone(),
    }
}

fn emit_status(app: &AppHandle, event: RecordingStatusEvent) -> Result<(), AppError> {
    app.emit("recording/status", event)
        .map_err(|error| AppError::new("EVENT_ERROR", error.to_string(), None))
}

#[tauri::command]
pub async fn start_recording(
    app: AppHandle,
    state: State<'_, RuntimeState>,
) -> Result<String, AppError> {
    ensure_ffmpeg_available()?;
    let capability = platform_capability();
    if !capability.supports_screen_capture {
        return Err(AppError::new(
            "PLATFORM_NOT_SUPPORTED",
            "screen capture is not supported on this platform",
            None,
        ));
    }

    let mut profile = state
        .profile
        .lock()
        .map_err(|_| state_lock_error("capture profile"))?
        .clone();
    let mut degrade_message = None;
    if profile.webcam_enabled && !capability.supports_webcam {
        profile.webcam_enabled = false;
        degrade_message = capability.webcam_degrade_message.clone();
    }

    ensure_recordings_dir(&state.recordings_root)?;
    let session_id = Uuid::new_v4().to_string();
    let output_path = artifact_path(
        &state.recordings_root,
        &session_id,
        profile.quality.container(),
    );
    let countdown_secs = profile.countdown_secs;

    {
        let mut slot = state
            .session
            .lock()
            .map_err(|_| state_lock_error("recording session"))?;
        if slot
            .as_ref()
            .map(|session| session.machine.state().is_active())
            .unwrap_or(false)
        {
            return Err(AppError::new(
                "RECORDING_ALREADY_ACTIVE",
                "a recording session is already active",
                Some("stop the current recording before starting a new one".to_string()),
            ));
        }
        let mut session = ActiveSession::new(session_id.clone(), profile, output_path);
        session.degrade_message = degrade_message;
        if countdown_secs > 0 {
            session.machine.begin_countdown(countdown_secs)?;
        }
        *slot = Some(session);
    }

    if countdown_secs > 0 {
        let _ = app.emit(
            "recording/countdown",
            CountdownTickEvent {
                session_id: session_id.clone(),
                remaining: countdown_secs,
            },
        );
        schedule_countdown_ticker(app.clone(), session_id.clone());
    } else {
        if let Err(error) = launch_capture(&app, &session_id) {
            clear_session(&app, &session_id);
            return Err(error);
        }
        schedule_status_ticker(app.clone(), session_id.clone());
    }

    tracing::info!(%session_id, countdown_secs, "recording session started");
    Ok(session_id)
}

#[tauri::command]
pub async fn pause_recording(app: AppHandle) -> Result<(), AppError> {
    pause_active_session(&app)
}

#[tauri::command]
pub async fn resume_recording(app: AppHandle) -> Result<(), AppError> {
    resume_active_session(&app)
}

#[tauri::command]
pub async fn stop_recording(app: AppHandle) -> Result<Option<FinishedRecording>, AppError> {
    stop_active_session(&app)
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub state: SessionState,
    pub duration_secs: u64,
    pub bytes_recorded: u64,
    pub degrade_message: Option<String>,
}

#[tauri::command]
pub async fn get_session_status(
    state: State<'_, RuntimeState>,
) -> Result<Option<SessionSnapshot>, AppError> {
    let slot = state
        .session
        .lock()
        .map_err(|_| state_lock_error("recording session"))?;
    Ok(slot.as_ref().map(|session| SessionSnapshot {
        session_id: session.session_id.clone(),
        state: session.machine.state(),
        duration_secs: session.duration_secs,
        bytes_recorded: session.bytes_recorded,
        degrade_message: session.degrade_message.clone(),
    }))
}

/// Resolves a key against the dispatcher and executes the bound action.
/// Returns whether the key was bound so the webview can suppress the
/// default browser action for handled keys only.
#[tauri::command]
pub async fn press_hotkey(
    app: AppHandle,
    state: State<'_, RuntimeState>,
    key: String,
) -> Result<bool, AppError> {
    let Some(action) = state.hotkeys.resolve(&key) else {
        return Ok(false);
    };
    let session_state = state
        .session
        .lock()
        .map_err(|_| state_lock_error("recording session"))?
        .as_ref()
        .map(|session| session.machine.state());
    match action {
        HotkeyAction::TogglePauseResume => match session_state {
            Some(SessionState::Recording) => pause_active_session(&app)?,
            Some(SessionState::Paused) => resume_active_session(&app)?,
            _ => {}
        },
        HotkeyAction::StopRecording => {
            if session_state.map(|s| s.is_active()).unwrap_or(false) {
                stop_active_session(&app)?;
            }
        }
    }
    Ok(true)
}

pub(crate) fn pause_active_session(app: &AppHandle) -> Result<(), AppError> {
    let state = app.state::<RuntimeState>();
    let event = {
        let mut slot = state
            .session
            .lock()
            .map_err(|_| state_lock_error("recording session"))?;
        let session = slot.as_mut().ok_or_else(|| {
            AppError::new(
                "INVALID_SESSION_STATE",
                "no active recording session",
                Some("start a recording first".to_string()),
            )
        })?;
        session.machine.pause()?;
        status_event_for(session, "Recording paused")
    };

    let mut capture = state
        .capture
        .lock()
        .map_err(|_| state_lock_error("capture process"))?;
    let process = capture.as_mut().ok_or_else(|| {
        AppError::new(
            "INVALID_SESSION_STATE",
            "no capture process for the active session",
            None,
        )
    })?;
    toggle_capture_pause(&mut process.child)?;
    drop(capture);

    emit_status(app, event)
}

pub(crate) fn resume_active_session(app: &AppHandle) -> Result<(), AppError> {
    let state = app.state::<RuntimeState>();
    let event = {
        let mut slot = state
            .session
            .lock()
            .map_err(|_| state_lock_error("recording session"))?;
        let session = slot.as_mut().ok_or_else(|| {
            AppError::new(
                "INVALID_SESSION_STATE",
                "no active recording session",
                Some("start a recording first".to_string()),
            )
        })?;
        session.machine.resume()?;
        status_event_for(session, "Recording resumed")
    };

    let mut capture = state
        .capture
        .lock()
        .map_err(|_| state_lock_error("capture process"))?;
    let process = capture.as_mut().ok_or_else(|| {
        AppError::new(
            "INVALID_SESSION_STATE",
            "no capture process for the active session",
            None,
        )
    })?;
    toggle_capture_pause(&mut process.child)?;
    drop(capture);

    emit_status(app, event)
}

/// Stops the active session. Idempotent: with no session this is a no-op.
/// A session still counting down is cancelled back to idle without ever
/// capturing; a recording or paused session is finalized into a
/// `FinishedRecording` that lands in the history store and the latest slot.
pub(crate) fn stop_active_session(app: &AppHandle) -> Result<Option<FinishedRecording>, AppError> {
    let state = app.state::<RuntimeState>();
    let mut slot = state
        .session
        .lock()
        .map_err(|_| state_lock_error("recording session"))?;
    let Some(session) = slot.as_mut() else {
        return Ok(None);
    };

    match session.machine.state() {
        SessionState::CountingDown { .. } => {
            session.machine.cancel()?;
            let event = status_event_for(session, "Countdown cancelled");
            let session_id = session.session_id.clone();
            *slot = None;
            drop(slot);
            tracing::info!(%session_id, "countdown cancelled");
            emit_status(app, event)?;
            Ok(None)
        }
        SessionState::Recording | SessionState::Paused => {
            session.machine.stop()?;
            // Taking the session out of the slot halts the tickers before
            // they can observe another second.
            let mut session = slot.take().expect("session checked above");
            drop(slot);

            let process = state
                .capture
                .lock()
                .map_err(|_| state_lock_error("capture process"))?
                .take();
            if let Some(mut process) = process {
                stop_capture_process(&mut process.child)?;
            }
            if let Some(len) = artifact_len(&session.output_path) {
                session.observe_output_len(len);
            }

            let recording = FinishedRecording {
                id: session.session_id.clone(),
                path: session.output_path.to_string_lossy().to_string(),
                timestamp_ms: Utc::now().timestamp_millis(),
                duration_secs: session.duration_secs,
                file_size_bytes: session.bytes_recorded,
                quality: session.profile.quality,
                format: session.profile.quality.container().to_string(),
            };
            state.history.add(recording.clone());
            *state
                .latest
                .lock()
                .map_err(|_| state_lock_error("latest recording"))? = Some(recording.clone());

            tracing::info!(
                session_id = %recording.id,
                duration_secs = recording.duration_secs,
                file_size_bytes = recording.file_size_bytes,
                "recording stopped"
            );
            emit_status(
                app,
                RecordingStatusEvent {
                    session_id: recording.id.clone(),
                    status: "stopped".to_string(),
                    duration_secs: recording.duration_secs,
                    bytes_recorded: recording.file_size_bytes,
                    mode_label: session.profile.mode.label().to_string(),
                    detail: "Recording stopped".to_string(),
                    degrade_message: session.degrade_message.clone(),
                },
            )?;
            Ok(Some(recording))
        }
        SessionState::Idle | SessionState::Stopped => {
            *slot = None;
            Ok(None)
        }
    }
}

/// Acquires the capture process for a session whose countdown has finished
/// (or that skipped the countdown). Bails out silently when the session was
/// stopped in the meantime.
fn launch_capture(app: &AppHandle, session_id: &str) -> Result<(), AppError> {
    let state = app.state::<RuntimeState>();
    let snapshot = {
        let slot = state
            .session
            .lock()
            .map_err(|_| state_lock_error("recording session"))?;
        slot.as_ref()
            .filter(|session| session.session_id == session_id)
            .map(|session| (session.profile.clone(), session.output_path.clone()))
    };
    let Some((profile, output_path)) = snapshot else {
        return Ok(());
    };

    let spawn = spawn_capture_process(&ffmpeg_bin(), &profile, &output_path)?;

    let event = {
        let mut slot = state
            .session
            .lock()
            .map_err(|_| state_lock_error("recording session"))?;
        let Some(session) = slot
            .as_mut()
            .filter(|session| session.session_id == session_id)
        else {
            // Stopped while the process was spawning: tear it down again.
            let mut child = spawn.child;
            let _ = stop_capture_process(&mut child);
            return Ok(());
        };
        session.machine.begin_recording()?;
        if session.degrade_message.is_none() {
            session.degrade_message = spawn.degrade_message;
        }
        state
            .capture
            .lock()
            .map_err(|_| state_lock_error("capture process"))?
            .replace(CaptureProcess { child: spawn.child });
        status_event_for(session, "Recording started")
    };
    emit_status(app, event)
}

fn clear_session(app: &AppHandle, session_id: &str) {
    let state = app.state::<RuntimeState>();
    if let Ok(mut slot) = state.session.lock() {
        if slot
            .as_ref()
            .map(|session| session.session_id == session_id)
            .unwrap_or(false)
        {
            *slot = None;
        }
    }
    if let Ok(mut capture) = state.capture.lock() {
        if let Some(mut process) = capture.take() {
            let _ = stop_capture_process(&mut process.child);
        }
    };
}

fn abort_session(app: &AppHandle, session_id: &str, error: AppError) {
    let state = app.state::<RuntimeState>();
    let (mode_label, degrade_message) = state
        .session
        .lock()
        .ok()
        .and_then(|slot| {
            slot.as_ref()
                .filter(|session| session.session_id == session_id)
                .map(|session| {
                    (
                        session.profile.mode.label().to_string(),
                        session.degrade_message.clone(),
                    )
                })
        })
        .unwrap_or_else(|| ("screen".to_string(), None));
    clear_session(app, session_id);
    tracing::error!(session_id, %error, "recording session aborted");
    let _ = app.emit(
        "recording/status",
        RecordingStatusEvent {
            session_id: session_id.to_string(),
            status: "error".to_string(),
            duration_secs: 0,
            bytes_recorded: 0,
            mode_label,
            detail: error.message,
            degrade_message,
        },
    );
}

/// Pre-roll loop: one tick per second, emitting the remaining count, until
/// the countdown reaches zero and the capture launches. Cancellation is
/// observed through the session slot; a stopped session simply vanishes.
fn schedule_countdown_ticker(app: AppHandle, session_id: String) {
    tauri::async_runtime::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            let runtime = app.state::<RuntimeState>();
            let remaining = {
                let mut slot = match runtime.session.lock() {
                    Ok(slot) => slot,
                    Err(_) => break,
                };
                let Some(session) = slot
                    .as_mut()
                    .filter(|session| session.session_id == session_id)
                else {
                    break;
                };
                if !matches!(session.machine.state(), SessionState::CountingDown { .. }) {
                    break;
                }
                match session.machine.tick_countdown() {
                    Ok(remaining) => remaining,
                    Err(_) => break,
                }
            };
            let _ = app.emit(
                "recording/countdown",
                CountdownTickEvent {
                    session_id: session_id.clone(),
                    remaining,
                },
            );
            if remaining == 0 {
                match launch_capture(&app, &session_id) {
                    Ok(()) => schedule_status_ticker(app.clone(), session_id.clone()),
                    Err(error) => abort_session(&app, &session_id, error),
                }
                break;
            }
        }
    });
}

/// One-second accounting loop for an active capture: advances duration while
/// recording, folds the observed output length into the size accumulator,
/// watches for premature process exit and republishes the session status.
fn schedule_status_ticker(app: AppHandle, session_id: String) {
    tauri::async_runtime::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            let runtime = app.state::<RuntimeState>();
            let event = {
                let mut slot = match runtime.session.lock() {
                    Ok(slot) => slot,
                    Err(_) => break,
                };
                let Some(session) = slot
                    .as_mut()
                    .filter(|session| session.session_id == session_id)
                else {
                    break;
                };
                session.record_tick();
                if let Some(len) = artifact_len(&session.output_path) {
                    session.observe_output_len(len);
                }
                status_event_for(session, "Recording status update")
            };

            let process_exited = {
                let mut capture = match runtime.capture.lock() {
                    Ok(capture) => capture,
                    Err(_) => break,
                };
                match capture.as_mut() {
                    Some(process) => !matches!(process.child.try_wait(), Ok(None)),
                    None => true,
                }
            };
            if process_exited {
                abort_session(
                    &app,
                    &session_id,
                    AppError::new(
                        "CAPTURE_INTERRUPTED",
                        "capture process exited unexpectedly",
                        Some("check recording permissions and input devices".to_string()),
                    ),
                );
                break;
            }

            if app.emit("recording/status", event).is_err() {
                break;
            }
        }
    });
}
