use crate::core::capture::platform_capability;
use crate::domain::models::{AppError, FinishedRecording};
use crate::infra::storage::artifacts::{download_file_name, remove_artifact};
use crate::state::RuntimeState;
use chrono::Utc;
use std::path::PathBuf;
use tauri::{AppHandle, Manager, State};

#[tauri::command]
pub async fn latest_recording(
    state: State<'_, RuntimeState>,
) -> Result<Option<FinishedRecording>, AppError> {
    state
        .latest
        .lock()
        .map(|latest| latest.clone())
        .map_err(|_| lock_error())
}

/// Copies the latest artifact into a destination directory (the platform
/// download dir when none is given) under a `screencraft-<timestamp>` name
/// whose extension matches the real container.
#[tauri::command]
pub async fn save_recording(
    app: AppHandle,
    state: State<'_, RuntimeState>,
    destination_dir: Option<String>,
) -> Result<String, AppError> {
    let recording = require_latest(&state)?;
    let destination = match destination_dir {
        Some(dir) => PathBuf::from(dir),
        None => app.path().download_dir().map_err(|error| {
            AppError::new(
                "IO_ERROR",
                format!("failed to resolve download dir: {error}"),
                Some("pass an explicit destination directory".to_string()),
            )
        })?,
    };
    std::fs::create_dir_all(&destination).map_err(|error| {
        AppError::new(
            "IO_ERROR",
            format!("failed to create destination dir: {error}"),
            None,
        )
    })?;

    let target = destination.join(download_file_name(&recording, Utc::now()));
    std::fs::copy(&recording.path, &target).map_err(|error| {
        AppError::new(
            "IO_ERROR",
            format!("failed to copy recording: {error}"),
            Some("the artifact may have been discarded".to_string()),
        )
    })?;
    tracing::info!(id = %recording.id, target = %target.display(), "recording saved");
    Ok(target.to_string_lossy().to_string())
}

/// Hands the latest artifact to a native share surface. Platforms without
/// one report `SHARE_UNSUPPORTED`, distinct from `SHARE_FAIL` when the
/// artifact itself is gone; the artifact stays intact either way.
#[tauri::command]
pub async fn share_recording(state: State<'_, RuntimeState>) -> Result<(), AppError> {
    let recording = require_latest(&state)?;
    if !std::path::Path::new(&recording.path).exists() {
        return Err(AppError::new(
            "SHARE_FAIL",
            "recording artifact is missing",
            Some("record again before sharing".to_string()),
        ));
    }
    let capability = platform_capability();
    if !capability.supports_share {
        return Err(AppError::new(
            "SHARE_UNSUPPORTED",
            capability
                .share_unsupported_message
                .unwrap_or_else(|| "Sharing is not supported on this platform".to_string()),
            Some("save the recording and share the file manually".to_string()),
        ));
    }
    // No desktop target exposes a native share surface today; the artifact
    // handoff lands here once one does.
    Ok(())
}

/// Explicit reset of the finished artifact: the file is deleted (revoking
/// the handle), the matching history entry dropped and the latest slot
/// cleared. Idempotent when nothing is retained.
#[tauri::command]
pub async fn discard_recording(state: State<'_, RuntimeState>) -> Result<(), AppError> {
    discard_latest(&state)
}

pub(crate) fn discard_latest(state: &RuntimeState) -> Result<(), AppError> {
    let recording = state.latest.lock().map_err(|_| lock_error())?.take();
    let Some(recording) = recording else {
        return Ok(());
    };
    remove_artifact(&recording.path)?;
    state.history.remove(&recording.id);
    tracing::info!(id = %recording.id, "recording discarded");
    Ok(())
}

fn require_latest(state: &RuntimeState) -> Result<FinishedRecording, AppError> {
    state
        .latest
        .lock()
        .map_err(|_| lock_error())?
        .clone()
        .ok_or_else(|| {
            AppError::new(
                "NO_RECORDING",
                "no finished recording available",
                Some("stop a recording first".to_string()),
            )
        })
}

fn lock_error() -> AppError {
    AppError::new("STATE_LOCK_ERROR", "failed to lock latest recording", None)
}

#[cfg(test)]
mod tests {
    use super::{discard_latest, require_latest};
    use crate::domain::models::{FinishedRecording, Quality};
    use crate::state::RuntimeState;
    use tempfile::tempdir;

    fn retain_finished(state: &RuntimeState, path: &std::path::Path) {
        let recording = FinishedRecording {
            id: "a".to_string(),
            path: path.to_string_lossy().to_string(),
            timestamp_ms: 0,
            duration_secs: 3,
            file_size_bytes: 9,
            quality: Quality::High,
            format: "webm".to_string(),
        };
        state.history.add(recording.clone());
        *state.latest.lock().unwrap() = Some(recording);
    }

    #[test]
    fn require_latest_reports_no_recording() {
        let temp = tempdir().unwrap();
        let state = RuntimeState::new(temp.path().join("recordings"));
        assert_eq!(require_latest(&state).err().unwrap().code, "NO_RECORDING");
    }

    #[test]
    fn discard_revokes_artifact_and_history_entry() {
        let temp = tempdir().unwrap();
        let state = RuntimeState::new(temp.path().join("recordings"));
        let artifact = temp.path().join("a.webm");
        std::fs::write(&artifact, b"video").unwrap();
        retain_finished(&state, &artifact);

        discard_latest(&state).unwrap();

        assert!(!artifact.exists());
        assert!(state.history.is_empty());
        assert!(state.latest.lock().unwrap().is_none());
    }

    #[test]
    fn discard_with_nothing_retained_is_a_no_op() {
        let temp = tempdir().unwrap();
        let state = RuntimeState::new(temp.path().join("recordings"));
        discard_latest(&state).unwrap();
        discard_latest(&state).unwrap();
    }
}
