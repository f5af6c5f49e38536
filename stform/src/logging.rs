//! Logger setup for applications without their own logger.

use log::{LevelFilter, SetLoggerError};
use simplelog::{Config, SimpleLogger};

use crate::config::FormConfig;

/// Level implied by the configuration: debug records only when
/// `log_debug_messages` is set.
pub fn level(config: &FormConfig) -> LevelFilter {
    if config.log_debug_messages {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Install a `simplelog` logger at [`level`]. Fails if a logger is already set.
pub fn init(config: &FormConfig) -> Result<(), SetLoggerError> {
    SimpleLogger::init(level(config), Config::default())
}
