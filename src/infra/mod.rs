pub mod ffmpeg;
pub mod logging;
pub mod storage;
