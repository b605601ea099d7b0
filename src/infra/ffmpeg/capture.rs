use crate::core::capture::{video_constraints, CaptureConstraints, WEBCAM_HEIGHT, WEBCAM_WIDTH};
use crate::domain::models::{AppError, CaptureProfile, Quality};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

pub struct CaptureSpawn {
    pub child: Child,
    pub degrade_message: Option<String>,
}

struct InputLayout {
    webcam_index: Option<usize>,
    audio_index: Option<usize>,
    degrade_message: Option<String>,
}

fn build_capture_command(
    ffmpeg_bin: &str,
    profile: &CaptureProfile,
    output_path: &Path,
) -> (Command, Option<String>) {
    let constraints = video_constraints(profile.quality, profile.frame_rate);
    let mut command = Command::new(ffmpeg_bin);
    command.arg("-y");
    command.arg("-hide_banner");
    command.arg("-loglevel");
    command.arg("warning");
    command.stdin(Stdio::piped());
    command.stdout(Stdio::null());
    command.stderr(Stdio::null());

    #[cfg(target_os = "windows")]
    let layout = configure_windows_inputs(&mut command, profile, &constraints);

    #[cfg(target_os = "macos")]
    let layout = configure_macos_inputs(&mut command, profile, &constraints);

    #[cfg(target_os = "linux")]
    let layout = configure_linux_inputs(&mut command, profile, &constraints);

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    let layout = configure_mock_inputs(&mut command, profile, &constraints);

    if let Some(webcam_index) = layout.webcam_index {
        // Picture-in-picture: webcam scaled down and pinned bottom-right.
        command.arg("-filter_complex");
        command.arg(format!(
            "[{webcam_index}:v]scale=320:-1[cam];[0:v][cam]overlay=main_w-overlay_w-24:main_h-overlay_h-24[vout]"
        ));
        command.arg("-map");
        command.arg("[vout]");
    } else {
        command.arg("-map");
        command.arg("0:v:0");
    }

    match profile.quality {
        Quality::High => {
            command.arg("-c:v");
            command.arg("libvpx-vp9");
            command.arg("-deadline");
            command.arg("realtime");
            command.arg("-cpu-used");
            command.arg("8");
            command.arg("-b:v");
            command.arg("0");
            command.arg("-crf");
            command.arg("30");
        }
        Quality::Medium | Quality::Low => {
            command.arg("-pix_fmt");
            command.arg("yuv420p");
            command.arg("-c:v");
            command.arg("libx264");
            command.arg("-preset");
            command.arg("ultrafast");
            command.arg("-movflags");
            command.arg("+faststart");
        }
    }

    if let Some(audio_index) = layout.audio_index {
        command.arg("-map");
        command.arg(format!("{audio_index}:a:0"));
        command.arg("-c:a");
        match profile.quality {
            Quality::High => command.arg("libopus"),
            Quality::Medium | Quality::Low => command.arg("aac"),
        };
        command.arg("-b:a");
        command.arg("128k");
    } else {
        command.arg("-an");
    }

    command.arg("-r");
    command.arg(profile.frame_rate.to_string());
    command.arg(output_path.as_os_str());

    (command, layout.degrade_message)
}

#[cfg(target_os = "linux")]
fn configure_linux_inputs(
    command: &mut Command,
    profile: &CaptureProfile,
    constraints: &CaptureConstraints,
) -> InputLayout {
    let display = std::env::var("DISPLAY").ok();
    let mut degrade_message = None;
    match display.as_deref() {
        Some(display) => {
            command.arg("-f").arg("x11grab");
            command
                .arg("-framerate")
                .arg(constraints.frame_rate.to_string());
            command.arg("-video_size").arg(constraints.size());
            command.arg("-i").arg(display);
        }
        None => {
            command.arg("-f").arg("lavfi");
            command.arg("-i").arg(format!(
                "testsrc2=size={}:rate={}",
                constraints.size(),
                constraints.frame_rate
            ));
            degrade_message =
                Some("No display server detected, using a synthetic capture source".to_string());
        }
    }

    let mut next_index = 1usize;
    let mut webcam_index = None;
    if profile.webcam_enabled {
        if display.is_some() && std::path::Path::new("/dev/video0").exists() {
            command.arg("-f").arg("v4l2");
            command
                .arg("-video_size")
                .arg(format!("{WEBCAM_WIDTH}x{WEBCAM_HEIGHT}"));
            command.arg("-i").arg("/dev/video0");
            webcam_index = Some(next_index);
            next_index += 1;
        } else if degrade_message.is_none() {
            degrade_message = Some(
                "Failed to access webcam, recording will continue without it".to_string(),
            );
        }
    }

    let audio_index = if profile.audio_enabled {
        if display.is_some() {
            command.arg("-f").arg("pulse");
            command.arg("-i").arg("default");
        } else {
            command.arg("-f").arg("lavfi");
            command
                .arg("-i")
                .arg("anullsrc=channel_layout=stereo:sample_rate=48000");
        }
        Some(next_index)
    } else {
        None
    };

    InputLayout {
        webcam_index,
        audio_index,
        degrade_message,
    }
}

#[cfg(target_os = "windows")]
fn configure_windows_inputs(
    command: &mut Command,
    profile: &CaptureProfile,
    constraints: &CaptureConstraints,
) -> InputLayout {
    command.arg("-f").arg("gdigrab");
    command
        .arg("-framerate")
        .arg(constraints.frame_rate.to_string());
    command.arg("-video_size").arg(constraints.size());
    command.arg("-i").arg("desktop");

    let mut next_index = 1usize;
    let mut webcam_index = None;
    if profile.webcam_enabled {
        let device = std::env::var("SCREENCRAFT_WEBCAM_DEVICE")
            .unwrap_or_else(|_| "video=Integrated Camera".to_string());
        command.arg("-f").arg("dshow");
        command
            .arg("-video_size")
            .arg(format!("{WEBCAM_WIDTH}x{WEBCAM_HEIGHT}"));
        command.arg("-i").arg(device);
        webcam_index = Some(next_index);
        next_index += 1;
    }

    let audio_index = if profile.audio_enabled {
        let device = std::env::var("SCREENCRAFT_MIC_DEVICE")
            .unwrap_or_else(|_| "audio=Microphone".to_string());
        command.arg("-f").arg("dshow");
        command.arg("-i").arg(device);
        Some(next_index)
    } else {
        None
    };

    InputLayout {
        webcam_index,
        audio_index,
        degrade_message: None,
    }
}

#[cfg(target_os = "macos")]
fn configure_macos_inputs(
    command: &mut Command,
    profile: &CaptureProfile,
    constraints: &CaptureConstraints,
) -> InputLayout {
    command.arg("-f").arg("avfoundation");
    command
        .arg("-framerate")
        .arg(constraints.frame_rate.to_string());
    command.arg("-video_size").arg(constraints.size());
    command.arg("-i").arg("1:none");

    let mut next_index = 1usize;
    let mut webcam_index = None;
    if profile.webcam_enabled {
        command.arg("-f").arg("avfoundation");
        command.arg("-framerate").arg("30");
        command
            .arg("-video_size")
            .arg(format!("{WEBCAM_WIDTH}x{WEBCAM_HEIGHT}"));
        command.arg("-i").arg("0:none");
        webcam_index = Some(next_index);
        next_index += 1;
    }

    let audio_index = if profile.audio_enabled {
        command.arg("-f").arg("avfoundation");
        command.arg("-i").arg("none:0");
        Some(next_index)
    } else {
        None
    };

    InputLayout {
        webcam_index,
        audio_index,
        degrade_message: None,
    }
}

#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
fn configure_mock_inputs(
    command: &mut Command,
    profile: &CaptureProfile,
    constraints: &CaptureConstraints,
) -> InputLayout {
    command.arg("-f").arg("lavfi");
    command.arg("-i").arg(format!(
        "testsrc2=size={}:rate={}",
        constraints.size(),
        constraints.frame_rate
    ));
    let audio_index = if profile.audio_enabled {
        command.arg("-f").arg("lavfi");
        command
            .arg("-i")
            .arg("anullsrc=channel_layout=stereo:sample_rate=48000");
        Some(1)
    } else {
        None
    };
    InputLayout {
        webcam_index: None,
        audio_index,
        degrade_message: Some(
            "Screen capture is not supported here, using a synthetic source".to_string(),
        ),
    }
}

fn exited_too_early(child: &mut Child) -> Result<bool, AppError> {
    std::thread::sleep(Duration::from_millis(400));
    let status = child.try_wait().map_err(|error| {
        AppError::new(
            "CAPTURE_START_FAIL",
            format!("failed to query capture process status: {error}"),
            None,
        )
    })?;
    Ok(status.is_some())
}

/// Spawns the composed capture. A webcam that cannot be opened never blocks
/// the primary screen capture: the process is respawned screen-only and the
/// caller gets a non-fatal degrade message.
pub fn spawn_capture_process(
    ffmpeg_bin: &str,
    profile: &CaptureProfile,
    output_path: &Path,
) -> Result<CaptureSpawn, AppError> {
    let (mut command, degrade_message) = build_capture_command(ffmpeg_bin, profile, output_path);
    let mut child = command.spawn().map_err(|error| {
        AppError::new(
            "CAPTURE_START_FAIL",
            format!("failed to start capture process: {error}"),
            Some("check screen recording permission and capture devices".to_string()),
        )
    })?;

    if exited_too_early(&mut child)? {
        if profile.webcam_enabled {
            let mut fallback_profile = profile.clone();
            fallback_profile.webcam_enabled = false;

            let (mut fallback_command, _) =
                build_capture_command(ffmpeg_bin, &fallback_profile, output_path);
            let mut fallback_child = fallback_command.spawn().map_err(|error| {
                AppError::new(
                    "CAPTURE_START_FAIL",
                    format!("failed to start screen-only capture process: {error}"),
                    Some("check screen recording permission".to_string()),
                )
            })?;

            if exited_too_early(&mut fallback_child)? {
                return Err(AppError::new(
                    "CAPTURE_START_FAIL",
                    "capture process exited immediately after start",
                    Some(
                        "grant screen recording permission and verify capture devices"
                            .to_string(),
                    ),
                ));
            }

            return Ok(CaptureSpawn {
                child: fallback_child,
                degrade_message: Some(
                    "Failed to access webcam, recording will continue without it".to_string(),
                ),
            });
        }

        return Err(AppError::new(
            "CAPTURE_START_FAIL",
            "capture process exited immediately after start",
            Some("grant screen recording permission and verify capture devices".to_string()),
        ));
    }

    Ok(CaptureSpawn {
        child,
        degrade_message,
    })
}

pub fn send_capture_stdin(child: &mut Child, payload: &[u8]) -> Result<(), AppError> {
    let stdin = child.stdin.as_mut().ok_or_else(|| {
        AppError::new(
            "CAPTURE_PROCESS_IO",
            "capture process stdin not available",
            None,
        )
    })?;
    use std::io::Write;
    stdin.write_all(payload).map_err(|error| {
        AppError::new(
            "CAPTURE_PROCESS_IO",
            format!("failed to write command to capture stdin: {error}"),
            None,
        )
    })?;
    stdin.flush().map_err(|error| {
        AppError::new(
            "CAPTURE_PROCESS_IO",
            format!("failed to flush capture stdin: {error}"),
            None,
        )
    })
}

/// ffmpeg toggles pause/resume on the same stdin command.
pub fn toggle_capture_pause(child: &mut Child) -> Result<(), AppError> {
    send_capture_stdin(child, b"p\n")
}

pub fn stop_capture_process(child: &mut Child) -> Result<(), AppError> {
    let _ = send_capture_stdin(child, b"q\n");
    for _ in 0..30 {
        if child
            .try_wait()
            .map_err(|error| {
                AppError::new(
                    "CAPTURE_STOP_FAIL",
                    format!("failed to query capture process status: {error}"),
                    None,
                )
            })?
            .is_some()
        {
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    child.kill().map_err(|error| {
        AppError::new(
            "CAPTURE_STOP_FAIL",
            format!("failed to kill capture process: {error}"),
            None,
        )
    })?;
    Ok(())
}

pub fn build_capture_debug_command(
    profile: &CaptureProfile,
    output_path: &Path,
) -> Vec<OsString> {
    let (command, _) = build_capture_command("ffmpeg", profile, output_path);
    command
        .get_args()
        .map(|arg| arg.to_os_string())
        .collect::<Vec<_>>()
}

#[cfg(test)]
mod tests {
    use super::build_capture_debug_command;
    use crate::domain::models::{CaptureProfile, Quality};

    fn joined_args(profile: &CaptureProfile, output: &str) -> String {
        build_capture_debug_command(profile, std::path::Path::new(output))
            .iter()
            .map(|item| item.to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn low_quality_requests_854x480() {
        let profile = CaptureProfile {
            quality: Quality::Low,
            frame_rate: 30,
            ..Default::default()
        };
        let joined = joined_args(&profile, "capture.mp4");
        assert!(joined.contains("854x480"));
        assert!(joined.contains("-r 30"));
        assert!(joined.contains("capture.mp4"));
    }

    #[test]
    fn each_quality_requests_its_documented_size() {
        for (quality, size) in [
            (Quality::High, "1920x1080"),
            (Quality::Medium, "1280x720"),
            (Quality::Low, "854x480"),
        ] {
            let profile = CaptureProfile {
                quality,
                frame_rate: 24,
                ..Default::default()
            };
            let joined = joined_args(&profile, "capture.out");
            assert!(joined.contains(size), "missing {size} for {quality:?}");
        }
    }

    #[test]
    fn high_quality_encodes_vp9_webm() {
        let profile = CaptureProfile {
            quality: Quality::High,
            ..Default::default()
        };
        let joined = joined_args(&profile, "capture.webm");
        assert!(joined.contains("libvpx-vp9"));
        assert!(!joined.contains("libx264"));
    }

    #[test]
    fn medium_quality_encodes_h264() {
        let profile = CaptureProfile {
            quality: Quality::Medium,
            ..Default::default()
        };
        let joined = joined_args(&profile, "capture.mp4");
        assert!(joined.contains("libx264"));
        assert!(joined.contains("+faststart"));
    }

    #[test]
    fn disabled_audio_drops_the_audio_track() {
        let profile = CaptureProfile {
            audio_enabled: false,
            ..Default::default()
        };
        let joined = joined_args(&profile, "capture.webm");
        assert!(joined.contains("-an"));
        assert!(!joined.contains("-c:a"));
    }

    #[test]
    fn enabled_audio_maps_an_audio_stream() {
        let profile = CaptureProfile {
            audio_enabled: true,
            ..Default::default()
        };
        let joined = joined_args(&profile, "capture.webm");
        assert!(joined.contains("-c:a"));
        assert!(!joined.contains("-an "));
    }
}
