pub mod constraints;
pub mod service;

pub use constraints::{video_constraints, CaptureConstraints, WEBCAM_HEIGHT, WEBCAM_WIDTH};
pub use service::{platform_capability, PlatformCapability};
