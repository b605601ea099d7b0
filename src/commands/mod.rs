pub mod export;
pub mod history;
pub mod recording;
pub mod settings;
