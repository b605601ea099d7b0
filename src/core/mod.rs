pub mod capture;
pub mod history;
pub mod hotkeys;
