use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformCapability {
    pub platform: String,
    pub supports_screen_capture: bool,
    pub supports_webcam: bool,
    pub supports_microphone: bool,
    pub supports_share: bool,
    pub webcam_degrade_message: Option<String>,
    pub share_unsupported_message: Option<String>,
}

pub fn platform_capability() -> PlatformCapability {
    #[cfg(target_os = "windows")]
    {
        PlatformCapability {
            platform: "windows".to_string(),
            supports_screen_capture: true,
            supports_webcam: true,
            supports_microphone: true,
            supports_share: false,
            webcam_degrade_message: None,
            share_unsupported_message: Some(
                "Sharing is not supported on this platform".to_string(),
            ),
        }
    }
    #[cfg(target_os = "macos")]
    {
        PlatformCapability {
            platform: "macos".to_string(),
            supports_screen_capture: true,
            supports_webcam: true,
            supports_microphone: true,
            supports_share: false,
            webcam_degrade_message: None,
            share_unsupported_message: Some(
                "Sharing is not supported on this platform".to_string(),
            ),
        }
    }
    #[cfg(target_os = "linux")]
    {
        let has_display = std::env::var("DISPLAY").is_ok();
        let has_webcam = std::path::Path::new("/dev/video0").exists();
        PlatformCapability {
            platform: "linux".to_string(),
            // Without an X display the pipeline still runs on a synthetic
            // source, so screen capture stays available in degraded form.
            supports_screen_capture: true,
            supports_webcam: has_display && has_webcam,
            supports_microphone: true,
            supports_share: false,
            webcam_degrade_message: if has_display && has_webcam {
                None
            } else {
                Some(
                    "No webcam device available, recording will continue without it".to_string(),
                )
            },
            share_unsupported_message: Some(
                "Sharing is not supported on this platform".to_string(),
            ),
        }
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        PlatformCapability {
            platform: "unsupported".to_string(),
            supports_screen_capture: true,
            supports_webcam: false,
            supports_microphone: false,
            supports_share: false,
            webcam_degrade_message: Some(
                "Webcam capture is not available on this platform".to_string(),
            ),
            share_unsupported_message: Some(
                "Sharing is not supported on this platform".to_string(),
            ),
        }
    }
}
