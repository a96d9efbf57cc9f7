// Library surface for headless/integration tests and reuse.
// The binary in main.rs only adds CLI parsing and terminal setup.
pub mod access;
pub mod app;
pub mod app_dirs;
pub mod coach;
pub mod config;
pub mod credential;
pub mod generator;
pub mod guide;
pub mod inflight;
pub mod input;
pub mod logging;
pub mod model;
pub mod runtime;
pub mod session;
pub mod transcript;
pub mod ui;

pub use coach::{Coach, CoachError, Phase};
