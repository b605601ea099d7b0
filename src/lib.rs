pub mod commands;
pub mod core;
pub mod domain;
pub mod infra;
pub mod state;

use commands::export::{discard_recording, latest_recording, save_recording, share_recording};
use commands::history::{clear_recordings, list_recordings, remove_recording};
use commands::recording::{
    get_session_status, pause_recording, press_hotkey, resume_recording, start_recording,
    stop_recording,
};
use commands::settings::{
    get_capture_profile, get_platform_capability, hydrate_runtime_state, load_hotkeys,
    save_hotkeys, toggle_audio, toggle_webcam, update_capture_profile,
};
use infra::logging::init_tracing;
use state::RuntimeState;
use tauri::Manager;

pub fn run() {
    init_tracing();

    tauri::Builder::default()
        .setup(|app| {
            let app_data_dir = app
                .path()
                .app_data_dir()
                .map_err(|error| error.to_string())?;
            std::fs::create_dir_all(app_data_dir.join("recordings"))
                .map_err(|error| error.to_string())?;
            let runtime = RuntimeState::new(app_data_dir.join("recordings"));
            if let Err(error) = hydrate_runtime_state(&runtime) {
                tracing::warn!(%error, "failed to load settings, using defaults");
            }
            app.manage(runtime);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            start_recording,
            pause_recording,
            resume_recording,
            stop_recording,
            get_session_status,
            press_hotkey,
            get_platform_capability,
            get_capture_profile,
            update_capture_profile,
            toggle_webcam,
            toggle_audio,
            load_hotkeys,
            save_hotkeys,
            list_recordings,
            remove_recording,
            clear_recordings,
            latest_recording,
            save_recording,
            share_recording,
            discard_recording
        ])
        .run(tauri::generate_context!())
        .expect("failed to run ScreenCraft");
}
