use serde::{Deserialize, Serialize};

/// Preview-framing label only. It is carried through the profile and status
/// events but never changes which capture source is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingMode {
    Screen,
    Window,
    Mobile,
}

impl RecordingMode {
    pub fn label(&self) -> &'static str {
        match self {
            RecordingMode::Screen => "screen",
            RecordingMode::Window => "window",
            RecordingMode::Mobile => "mobile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    High,
    Medium,
    Low,
}

impl Quality {
    pub fn label(&self) -> &'static str {
        match self {
            Quality::High => "high",
            Quality::Medium => "medium",
            Quality::Low => "low",
        }
    }

    /// Container tracks the encoder the capture pipeline actually uses, so
    /// exported filenames always carry the true extension.
    pub fn container(&self) -> &'static str {
        match self {
            Quality::High => "webm",
            Quality::Medium | Quality::Low => "mp4",
        }
    }
}

pub const SUPPORTED_FRAME_RATES: [u8; 3] = [24, 30, 60];
pub const SUPPORTED_COUNTDOWNS: [u32; 4] = [0, 3, 5, 10];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureProfile {
    pub mode: RecordingMode,
    pub quality: Quality,
    pub frame_rate: u8,
    pub countdown_secs: u32,
    pub webcam_enabled: bool,
    pub audio_enabled: bool,
}

impl Default for CaptureProfile {
    fn default() -> Self {
        Self {
            mode: RecordingMode::Screen,
            quality: Quality::High,
            frame_rate: 60,
            countdown_secs: 3,
            webcam_enabled: false,
            audio_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CaptureProfilePatch {
    pub mode: Option<RecordingMode>,
    pub quality: Option<Quality>,
    pub frame_rate: Option<u8>,
    pub countdown_secs: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedRecording {
    pub id: String,
    pub path: String,
    pub timestamp_ms: i64,
    pub duration_secs: u64,
    pub file_size_bytes: u64,
    pub quality: Quality,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingStatusEvent {
    pub session_id: String,
    pub status: String,
    pub duration_secs: u64,
    pub bytes_recorded: u64,
    pub mode_label: String,
    pub detail: String,
    pub degrade_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownTickEvent {
    pub session_id: String,
    pub remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl AppError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        suggestion: Option<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion,
        }
    }
}

pub fn validate_profile_patch(patch: &CaptureProfilePatch) -> Result<(), AppError> {
    if let Some(frame_rate) = patch.frame_rate {
        if !SUPPORTED_FRAME_RATES.contains(&frame_rate) {
            return Err(AppError::new(
                "INVALID_PROFILE",
                format!("unsupported frame rate: {frame_rate}"),
                Some("pick one of 24, 30 or 60 fps".to_string()),
            ));
        }
    }
    if let Some(countdown_secs) = patch.countdown_secs {
        if !SUPPORTED_COUNTDOWNS.contains(&countdown_secs) {
            return Err(AppError::new(
                "INVALID_PROFILE",
                format!("unsupported countdown: {countdown_secs}s"),
                Some("pick one of 0, 3, 5 or 10 seconds".to_string()),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_profile_patch, CaptureProfile, CaptureProfilePatch, Quality};

    #[test]
    fn default_profile_matches_documented_defaults() {
        let profile = CaptureProfile::default();
        assert_eq!(profile.quality, Quality::High);
        assert_eq!(profile.frame_rate, 60);
        assert_eq!(profile.countdown_secs, 3);
        assert!(!profile.webcam_enabled);
        assert!(profile.audio_enabled);
    }

    #[test]
    fn container_follows_quality() {
        assert_eq!(Quality::High.container(), "webm");
        assert_eq!(Quality::Medium.container(), "mp4");
        assert_eq!(Quality::Low.container(), "mp4");
    }

    #[test]
    fn patch_validation_rejects_unsupported_values() {
        let patch = CaptureProfilePatch {
            frame_rate: Some(25),
            ..Default::default()
        };
        assert_eq!(
            validate_profile_patch(&patch).err().unwrap().code,
            "INVALID_PROFILE"
        );

        let patch = CaptureProfilePatch {
            countdown_secs: Some(4),
            ..Default::default()
        };
        assert!(validate_profile_patch(&patch).is_err());

        let patch = CaptureProfilePatch {
            frame_rate: Some(30),
            countdown_secs: Some(10),
            ..Default::default()
        };
        assert!(validate_profile_patch(&patch).is_ok());
    }
}
