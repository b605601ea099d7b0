use crate::core::history::HistoryStore;
use crate::core::hotkeys::HotkeyDispatcher;
use crate::domain::models::{CaptureProfile, FinishedRecording};
use crate::domain::state_machine::{SessionMachine, SessionState};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::process::Child;
use std::sync::Mutex;

#[derive(Debug)]
pub struct ActiveSession {
    pub session_id: String,
    pub profile: CaptureProfile,
    pub machine: SessionMachine,
    pub duration_secs: u64,
    pub bytes_recorded: u64,
    pub started_at: DateTime<Utc>,
    pub degrade_message: Option<String>,
    pub output_path: PathBuf,
}

impl ActiveSession {
    pub fn new(session_id: String, profile: CaptureProfile, output_path: PathBuf) -> Self {
        Self {
            session_id,
            profile,
            machine: SessionMachine::new(),
            duration_secs: 0,
            bytes_recorded: 0,
            started_at: Utc::now(),
            degrade_message: None,
            output_path,
        }
    }

    /// One wall-clock second elapsed. Duration only advances while actually
    /// recording, never during the countdown or while paused.
    pub fn record_tick(&mut self) -> bool {
        if self.machine.state() == SessionState::Recording {
            self.duration_secs += 1;
            true
        } else {
            false
        }
    }

    /// Folds a newly observed output length into the running total. The
    /// accumulator never goes backwards; stale or failed observations are
    /// ignored.
    pub fn observe_output_len(&mut self, len: u64) -> bool {
        if len > self.bytes_recorded {
            self.bytes_recorded = len;
            true
        } else {
            false
        }
    }
}

#[derive(Debug)]
pub struct CaptureProcess {
    pub child: Child,
}

pub struct RuntimeState {
    pub recordings_root: PathBuf,
    pub settings_path: PathBuf,
    pub session: Mutex<Option<ActiveSession>>,
    pub capture: Mutex<Option<CaptureProcess>>,
    pub profile: Mutex<CaptureProfile>,
    pub latest: Mutex<Option<FinishedRecording>>,
    pub history: HistoryStore,
    pub hotkeys: HotkeyDispatcher,
}

impl RuntimeState {
    pub fn new(recordings_root: PathBuf) -> Self {
        let settings_path = recordings_root
            .parent()
            .unwrap_or(recordings_root.as_path())
            .join("settings.json");
        Self {
            recordings_root,
            settings_path,
            session: Mutex::new(None),
            capture: Mutex::new(None),
            profile: Mutex::new(CaptureProfile::default()),
            latest: Mutex::new(None),
            history: HistoryStore::new(),
            hotkeys: HotkeyDispatcher::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ActiveSession;
    use crate::domain::models::CaptureProfile;
    use std::path::PathBuf;

    fn session() -> ActiveSession {
        ActiveSession::new(
            "session".to_string(),
            CaptureProfile::default(),
            PathBuf::from("/tmp/session.webm"),
        )
    }

    #[test]
    fn duration_only_advances_while_recording() {
        let mut session = session();
        session.machine.begin_countdown(3).unwrap();
        assert!(!session.record_tick());
        assert_eq!(session.duration_secs, 0);

        session.machine.tick_countdown().unwrap();
        session.machine.tick_countdown().unwrap();
        session.machine.tick_countdown().unwrap();
        session.machine.begin_recording().unwrap();
        assert!(session.record_tick());
        assert!(session.record_tick());
        assert_eq!(session.duration_secs, 2);

        session.machine.pause().unwrap();
        assert!(!session.record_tick());
        assert_eq!(session.duration_secs, 2);

        session.machine.resume().unwrap();
        assert!(session.record_tick());
        assert_eq!(session.duration_secs, 3);
    }

    #[test]
    fn byte_accumulator_is_monotonic() {
        let mut session = session();
        session.machine.begin_recording().unwrap();
        assert!(session.observe_output_len(1000));
        assert!(session.observe_output_len(2500));
        // A shrinking or repeated observation never decreases the total.
        assert!(!session.observe_output_len(2000));
        assert!(!session.observe_output_len(2500));
        assert_eq!(session.bytes_recorded, 2500);
    }

    #[test]
    fn new_session_starts_with_zeroed_accounting() {
        let session = session();
        assert_eq!(session.duration_secs, 0);
        assert_eq!(session.bytes_recorded, 0);
    }
}
