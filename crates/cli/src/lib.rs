//! dbfailover CLI - composition root shared by the three binaries

pub mod config;
pub mod logging;
pub mod wiring;

pub use crate::config::{DumpConfig, ImportConfig, LogsConfig};
pub use logging::init_tracing;
