use crate::domain::models::{AppError, FinishedRecording};
use crate::infra::storage::artifacts::remove_artifact;
use crate::state::RuntimeState;
use tauri::State;

#[tauri::command]
pub async fn list_recordings(
    state: State<'_, RuntimeState>,
) -> Result<Vec<FinishedRecording>, AppError> {
    Ok(state.history.list())
}

/// Removes one history entry and revokes its artifact. Unknown ids are a
/// no-op, matching the store contract.
#[tauri::command]
pub async fn remove_recording(
    state: State<'_, RuntimeState>,
    id: String,
) -> Result<(), AppError> {
    let Some(removed) = state.history.remove(&id) else {
        return Ok(());
    };
    remove_artifact(&removed.path)?;
    clear_latest_if_matching(&state, &removed.id)?;
    tracing::info!(%id, "recording removed from history");
    Ok(())
}

#[tauri::command]
pub async fn clear_recordings(state: State<'_, RuntimeState>) -> Result<(), AppError> {
    let drained = state.history.clear();
    for recording in &drained {
        remove_artifact(&recording.path)?;
        clear_latest_if_matching(&state, &recording.id)?;
    }
    tracing::info!(count = drained.len(), "recording history cleared");
    Ok(())
}

fn clear_latest_if_matching(state: &RuntimeState, id: &str) -> Result<(), AppError> {
    let mut latest = state
        .latest
        .lock()
        .map_err(|_| AppError::new("STATE_LOCK_ERROR", "failed to lock latest recording", None))?;
    if latest
        .as_ref()
        .map(|recording| recording.id == id)
        .unwrap_or(false)
    {
        *latest = None;
    }
    Ok(())
}
