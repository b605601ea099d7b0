pub mod capture;
pub mod command;
