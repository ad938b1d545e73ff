// The binary entry point is main.rs; it drives the terminal loop and key handling
// on top of the module tree declared here. Integration tests and benchmarks
// import through the same paths (`examsim::session::*`, `examsim::engine::*`).

rust_i18n::i18n!("locales", fallback = "en");

pub mod app;
pub mod bank;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod logging;
pub mod session;
pub mod store;
pub mod ui;

pub use error::{ExamError, ValidationError};
