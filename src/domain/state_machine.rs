use crate::domain::models::AppError;
use serde::{Deserialize, Serialize};

/// One tagged state per session phase. Pause without an active recording,
/// countdown alongside recording and similar flag combinations cannot be
/// expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    CountingDown { remaining: u32 },
    Recording,
    Paused,
    Stopped,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        !matches!(self, SessionState::Idle | SessionState::Stopped)
    }

    pub fn as_status(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::CountingDown { .. } => "counting_down",
            SessionState::Recording => "recording",
            SessionState::Paused => "paused",
            SessionState::Stopped => "stopped",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionMachine {
    state: SessionState,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn begin_countdown(&mut self, secs: u32) -> Result<(), AppError> {
        if self.state != SessionState::Idle {
            return Err(AppError::new(
                "INVALID_SESSION_STATE",
                "only an idle session can start a countdown",
                Some("stop the current session first".to_string()),
            ));
        }
        if secs == 0 {
            return Err(AppError::new(
                "INVALID_SESSION_STATE",
                "countdown requires a positive delay",
                None,
            ));
        }
        self.state = SessionState::CountingDown { remaining: secs };
        Ok(())
    }

    /// Decrements the pre-roll counter, returning the new remaining value.
    pub fn tick_countdown(&mut self) -> Result<u32, AppError> {
        match self.state {
            SessionState::CountingDown { remaining } if remaining > 0 => {
                let remaining = remaining - 1;
                self.state = SessionState::CountingDown { remaining };
                Ok(remaining)
            }
            _ => Err(AppError::new(
                "INVALID_SESSION_STATE",
                "no countdown in progress",
                None,
            )),
        }
    }

    pub fn begin_recording(&mut self) -> Result<(), AppError> {
        match self.state {
            SessionState::Idle | SessionState::CountingDown { remaining: 0 } => {
                self.state = SessionState::Recording;
                Ok(())
            }
            _ => Err(AppError::new(
                "INVALID_SESSION_STATE",
                "recording can only begin from idle or a finished countdown",
                Some("wait for the countdown to reach zero".to_string()),
            )),
        }
    }

    pub fn pause(&mut self) -> Result<(), AppError> {
        if self.state != SessionState::Recording {
            return Err(AppError::new(
                "INVALID_SESSION_STATE",
                "only a recording session can pause",
                Some("check whether recording has started".to_string()),
            ));
        }
        self.state = SessionState::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), AppError> {
        if self.state != SessionState::Paused {
            return Err(AppError::new(
                "INVALID_SESSION_STATE",
                "only a paused session can resume",
                Some("pause recording before resume".to_string()),
            ));
        }
        self.state = SessionState::Recording;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), AppError> {
        if self.state != SessionState::Recording && self.state != SessionState::Paused {
            return Err(AppError::new(
                "INVALID_SESSION_STATE",
                "only a recording or paused session can stop",
                Some("start recording before stop".to_string()),
            ));
        }
        self.state = SessionState::Stopped;
        Ok(())
    }

    /// Stop requested while the pre-roll is still counting: the countdown is
    /// cancelled and the session returns to idle without ever capturing.
    pub fn cancel(&mut self) -> Result<(), AppError> {
        if !matches!(self.state, SessionState::CountingDown { .. }) {
            return Err(AppError::new(
                "INVALID_SESSION_STATE",
                "only a counting-down session can cancel",
                None,
            ));
        }
        self.state = SessionState::Idle;
        Ok(())
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionMachine, SessionState};

    #[test]
    fn rejects_pause_from_idle() {
        let mut machine = SessionMachine::new();
        assert!(machine.pause().is_err());
        assert_eq!(machine.state(), SessionState::Idle);
    }

    #[test]
    fn full_flow_with_pause_and_resume() {
        let mut machine = SessionMachine::new();
        machine.begin_recording().unwrap();
        machine.pause().unwrap();
        machine.resume().unwrap();
        machine.stop().unwrap();
        assert_eq!(machine.state(), SessionState::Stopped);
    }

    #[test]
    fn countdown_ticks_down_to_recording() {
        let mut machine = SessionMachine::new();
        machine.begin_countdown(3).unwrap();
        let mut observed = vec![3];
        while let SessionState::CountingDown { remaining } = machine.state() {
            if remaining == 0 {
                break;
            }
            observed.push(machine.tick_countdown().unwrap());
        }
        assert_eq!(observed, vec![3, 2, 1, 0]);
        machine.begin_recording().unwrap();
        assert_eq!(machine.state(), SessionState::Recording);
    }

    #[test]
    fn recording_cannot_begin_mid_countdown() {
        let mut machine = SessionMachine::new();
        machine.begin_countdown(5).unwrap();
        assert!(machine.begin_recording().is_err());
    }

    #[test]
    fn cancel_returns_countdown_to_idle() {
        let mut machine = SessionMachine::new();
        machine.begin_countdown(5).unwrap();
        machine.tick_countdown().unwrap();
        machine.cancel().unwrap();
        assert_eq!(machine.state(), SessionState::Idle);
        assert!(!machine.state().is_active());
    }

    #[test]
    fn zero_countdown_is_rejected() {
        let mut machine = SessionMachine::new();
        assert!(machine.begin_countdown(0).is_err());
    }
}
