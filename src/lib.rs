pub mod audio;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod selection;
pub mod session;
pub mod ui;
