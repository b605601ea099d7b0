use crate::core::capture::{platform_capability, PlatformCapability};
use crate::core::hotkeys::{default_bindings, HotkeyBindings};
use crate::domain::models::{
    validate_profile_patch, AppError, CaptureProfile, CaptureProfilePatch,
};
use crate::state::RuntimeState;
use serde::{Deserialize, Serialize};
use tauri::State;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    profile: CaptureProfile,
    hotkeys: HotkeyBindings,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            profile: CaptureProfile::default(),
            hotkeys: default_bindings(),
        }
    }
}

#[tauri::command]
pub async fn get_platform_capability() -> PlatformCapability {
    platform_capability()
}

#[tauri::command]
pub async fn get_capture_profile(
    state: State<'_, RuntimeState>,
) -> Result<CaptureProfile, AppError> {
    state
        .profile
        .lock()
        .map(|profile| profile.clone())
        .map_err(|_| lock_error())
}

#[tauri::command]
pub async fn update_capture_profile(
    state: State<'_, RuntimeState>,
    patch: CaptureProfilePatch,
) -> Result<CaptureProfile, AppError> {
    ensure_no_active_session(&state, "Cannot change settings while recording")?;
    validate_profile_patch(&patch)?;

    let profile = {
        let mut profile = state.profile.lock().map_err(|_| lock_error())?;
        if let Some(mode) = patch.mode {
            profile.mode = mode;
        }
        if let Some(quality) = patch.quality {
            profile.quality = quality;
        }
        if let Some(frame_rate) = patch.frame_rate {
            profile.frame_rate = frame_rate;
        }
        if let Some(countdown_secs) = patch.countdown_secs {
            profile.countdown_secs = countdown_secs;
        }
        profile.clone()
    };
    persist_settings(&state)?;
    Ok(profile)
}

#[tauri::command]
pub async fn toggle_webcam(state: State<'_, RuntimeState>) -> Result<bool, AppError> {
    ensure_no_active_session(&state, "Cannot toggle webcam while recording")?;
    let enabled = {
        let mut profile = state.profile.lock().map_err(|_| lock_error())?;
        profile.webcam_enabled = !profile.webcam_enabled;
        profile.webcam_enabled
    };
    persist_settings(&state)?;
    Ok(enabled)
}

#[tauri::command]
pub async fn toggle_audio(state: State<'_, RuntimeState>) -> Result<bool, AppError> {
    ensure_no_active_session(&state, "Cannot toggle audio while recording")?;
    let enabled = {
        let mut profile = state.profile.lock().map_err(|_| lock_error())?;
        profile.audio_enabled = !profile.audio_enabled;
        profile.audio_enabled
    };
    persist_settings(&state)?;
    Ok(enabled)
}

#[tauri::command]
pub async fn load_hotkeys(state: State<'_, RuntimeState>) -> Result<HotkeyBindings, AppError> {
    Ok(state.hotkeys.bindings())
}

#[tauri::command]
pub async fn save_hotkeys(
    state: State<'_, RuntimeState>,
    hotkeys: HotkeyBindings,
) -> Result<(), AppError> {
    state.hotkeys.rebind(hotkeys);
    persist_settings(&state)
}

/// Loads persisted settings into the managed state at launch, seeding the
/// file with defaults on first run.
pub fn hydrate_runtime_state(state: &RuntimeState) -> Result<(), AppError> {
    let settings = load_or_default_settings(state)?;
    *state.profile.lock().map_err(|_| lock_error())? = settings.profile;
    state.hotkeys.rebind(settings.hotkeys);
    Ok(())
}

fn lock_error() -> AppError {
    AppError::new("STATE_LOCK_ERROR", "failed to lock runtime state", None)
}

fn ensure_no_active_session(state: &RuntimeState, message: &str) -> Result<(), AppError> {
    let slot = state.session.lock().map_err(|_| lock_error())?;
    if slot
        .as_ref()
        .map(|session| session.machine.state().is_active())
        .unwrap_or(false)
    {
        return Err(AppError::new(
            "RECORDING_ACTIVE",
            message,
            Some("stop the recording first".to_string()),
        ));
    }
    Ok(())
}

fn persist_settings(state: &RuntimeState) -> Result<(), AppError> {
    let settings = SettingsFile {
        profile: state
            .profile
            .lock()
            .map_err(|_| lock_error())?
            .clone(),
        hotkeys: state.hotkeys.bindings(),
    };
    write_settings(state, &settings)
}

fn load_or_default_settings(state: &RuntimeState) -> Result<SettingsFile, AppError> {
    if !state.settings_path.exists() {
        let settings = SettingsFile::default();
        write_settings(state, &settings)?;
        return Ok(settings);
    }
    let content = std::fs::read_to_string(&state.settings_path).map_err(|error| {
        AppError::new(
            "SETTINGS_READ_FAIL",
            format!("failed to read settings: {error}"),
            None,
        )
    })?;
    serde_json::from_str::<SettingsFile>(&content).map_err(|error| {
        AppError::new(
            "SETTINGS_PARSE_FAIL",
            format!("failed to parse settings: {error}"),
            None,
        )
    })
}

fn write_settings(state: &RuntimeState, settings: &SettingsFile) -> Result<(), AppError> {
    if let Some(parent) = state.settings_path.parent() {
        std::fs::create_dir_all(parent).map_err(|error| {
            AppError::new(
                "SETTINGS_WRITE_FAIL",
                format!("failed to create settings dir: {error}"),
                None,
            )
        })?;
    }
    let raw = serde_json::to_string_pretty(settings).map_err(|error| {
        AppError::new(
            "SETTINGS_WRITE_FAIL",
            format!("failed to serialize settings: {error}"),
            None,
        )
    })?;
    std::fs::write(&state.settings_path, raw).map_err(|error| {
        AppError::new(
            "SETTINGS_WRITE_FAIL",
            format!("failed to write settings: {error}"),
            None,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::{
        ensure_no_active_session, hydrate_runtime_state, load_or_default_settings, write_settings,
        SettingsFile,
    };
    use crate::core::hotkeys::HotkeyAction;
    use crate::domain::models::{CaptureProfile, Quality};
    use crate::state::{ActiveSession, RuntimeState};
    use tempfile::tempdir;

    #[test]
    fn first_load_seeds_defaults_on_disk() {
        let temp = tempdir().unwrap();
        let state = RuntimeState::new(temp.path().join("recordings"));
        let settings = load_or_default_settings(&state).unwrap();
        assert_eq!(settings.profile.quality, Quality::High);
        assert!(state.settings_path.exists());
    }

    #[test]
    fn settings_round_trip_preserves_profile_and_hotkeys() {
        let temp = tempdir().unwrap();
        let state = RuntimeState::new(temp.path().join("recordings"));
        let mut settings = SettingsFile::default();
        settings.profile.quality = Quality::Low;
        settings.profile.webcam_enabled = true;
        settings
            .hotkeys
            .insert("F9".to_string(), HotkeyAction::StopRecording);
        write_settings(&state, &settings).unwrap();

        hydrate_runtime_state(&state).unwrap();
        assert_eq!(state.profile.lock().unwrap().quality, Quality::Low);
        assert!(state.profile.lock().unwrap().webcam_enabled);
        assert_eq!(
            state.hotkeys.resolve("F9"),
            Some(HotkeyAction::StopRecording)
        );
    }

    #[test]
    fn active_session_blocks_profile_changes() {
        let temp = tempdir().unwrap();
        let state = RuntimeState::new(temp.path().join("recordings"));
        ensure_no_active_session(&state, "Cannot toggle webcam while recording").unwrap();

        let mut session = ActiveSession::new(
            "session".to_string(),
            CaptureProfile::default(),
            temp.path().join("recordings/session.webm"),
        );
        session.machine.begin_recording().unwrap();
        *state.session.lock().unwrap() = Some(session);

        let error = ensure_no_active_session(&state, "Cannot toggle webcam while recording")
            .err()
            .unwrap();
        assert_eq!(error.code, "RECORDING_ACTIVE");
        assert_eq!(error.message, "Cannot toggle webcam while recording");
    }
}
