use crate::domain::models::{AppError, FinishedRecording};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub fn ensure_recordings_dir(recordings_root: &Path) -> Result<(), AppError> {
    std::fs::create_dir_all(recordings_root).map_err(|error| {
        AppError::new(
            "IO_ERROR",
            format!("failed to create recordings dir: {error}"),
            Some("check path permissions".to_string()),
        )
    })
}

pub fn artifact_path(recordings_root: &Path, session_id: &str, container: &str) -> PathBuf {
    recordings_root.join(format!("{session_id}.{container}"))
}

/// Download names follow `screencraft-<ISO timestamp>.<ext>`, with colons
/// replaced so the name stays valid on every filesystem. The extension is
/// the artifact's real container.
pub fn download_file_name(recording: &FinishedRecording, now: DateTime<Utc>) -> String {
    format!(
        "screencraft-{}.{}",
        now.format("%Y-%m-%dT%H-%M-%SZ"),
        recording.format
    )
}

/// Revokes the artifact handle. Missing files are fine: the handle may have
/// been revoked already.
pub fn remove_artifact(path: &str) -> Result<(), AppError> {
    let path = Path::new(path);
    if !path.exists() {
        return Ok(());
    }
    std::fs::remove_file(path).map_err(|error| {
        AppError::new(
            "IO_ERROR",
            format!("failed to remove artifact: {error}"),
            Some("close any program holding the file open".to_string()),
        )
    })
}

pub fn artifact_len(path: &Path) -> Option<u64> {
    std::fs::metadata(path).map(|metadata| metadata.len()).ok()
}

#[cfg(test)]
mod tests {
    use super::{artifact_path, download_file_name, remove_artifact};
    use crate::domain::models::{FinishedRecording, Quality};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn recording(format: &str) -> FinishedRecording {
        FinishedRecording {
            id: "abc".to_string(),
            path: String::new(),
            timestamp_ms: 0,
            duration_secs: 12,
            file_size_bytes: 2048,
            quality: Quality::High,
            format: format.to_string(),
        }
    }

    #[test]
    fn download_name_carries_prefix_timestamp_and_container() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 14, 5, 9).unwrap();
        let name = download_file_name(&recording("webm"), now);
        assert_eq!(name, "screencraft-2026-08-30T14-05-09Z.webm");
        let name = download_file_name(&recording("mp4"), now);
        assert!(name.ends_with(".mp4"));
        assert!(!name.contains(':'));
    }

    #[test]
    fn artifact_path_is_id_dot_container() {
        let path = artifact_path(std::path::Path::new("/data"), "abc", "webm");
        assert_eq!(path, std::path::Path::new("/data/abc.webm"));
    }

    #[test]
    fn remove_artifact_is_idempotent() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("clip.webm");
        std::fs::write(&file, b"data").unwrap();
        let path = file.to_string_lossy().to_string();
        remove_artifact(&path).unwrap();
        assert!(!file.exists());
        remove_artifact(&path).unwrap();
    }
}
