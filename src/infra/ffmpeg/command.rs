use crate::domain::models::AppError;
use std::process::{Command, Stdio};

pub fn ffmpeg_bin() -> String {
    std::env::var("SCREENCRAFT_FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string())
}

pub fn ensure_ffmpeg_available() -> Result<(), AppError> {
    let output = Command::new(ffmpeg_bin())
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|error| {
            AppError::new(
                "FFMPEG_NOT_FOUND",
                format!("failed to execute ffmpeg: {error}"),
                Some(
                    "install ffmpeg and add it to PATH, or set SCREENCRAFT_FFMPEG_PATH"
                        .to_string(),
                ),
            )
        })?;
    if !output.status.success() {
        return Err(AppError::new(
            "FFMPEG_NOT_FOUND",
            "ffmpeg command exists but returns non-zero on -version",
            Some("verify the ffmpeg installation works".to_string()),
        ));
    }
    Ok(())
}
