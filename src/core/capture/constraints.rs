use crate::domain::models::Quality;

/// Secondary webcam feed is always requested at 720p regardless of the
/// screen-capture quality.
pub const WEBCAM_WIDTH: u32 = 1280;
pub const WEBCAM_HEIGHT: u32 = 720;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u8,
}

impl CaptureConstraints {
    pub fn size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

pub fn video_constraints(quality: Quality, frame_rate: u8) -> CaptureConstraints {
    let (width, height) = match quality {
        Quality::High => (1920, 1080),
        Quality::Medium => (1280, 720),
        Quality::Low => (854, 480),
    };
    CaptureConstraints {
        width,
        height,
        frame_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::video_constraints;
    use crate::domain::models::{Quality, SUPPORTED_FRAME_RATES};

    #[test]
    fn quality_table_matches_documented_resolutions() {
        for frame_rate in SUPPORTED_FRAME_RATES {
            let high = video_constraints(Quality::High, frame_rate);
            assert_eq!((high.width, high.height), (1920, 1080));
            assert_eq!(high.frame_rate, frame_rate);

            let medium = video_constraints(Quality::Medium, frame_rate);
            assert_eq!((medium.width, medium.height), (1280, 720));

            let low = video_constraints(Quality::Low, frame_rate);
            assert_eq!((low.width, low.height), (854, 480));
        }
    }

    #[test]
    fn low_quality_renders_as_854x480() {
        assert_eq!(video_constraints(Quality::Low, 30).size(), "854x480");
    }
}
