pub mod artifacts;
pub mod checks;
pub mod config;
pub mod error;
pub mod log;
pub mod matrix;
pub mod orchestrator;
pub mod platform;
pub mod report;
pub mod resolution;
pub mod result;
pub mod scripts;
pub mod session;

pub use error::{Error, Result};
