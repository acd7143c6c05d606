pub mod app;
pub mod config;
pub mod cue_scheduler;
pub mod match_manager;
pub mod session;
pub mod sound_controller;

/// Name used for the config file
pub const APP_NAME: &str = "gateball-timer";
