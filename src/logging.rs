use std::env;
use std::io::Write;

use log::{self, LevelFilter, Metadata, Record};

use crate::config::LOG_ENV_VAR;

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(std::io::stderr(), "{} - {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SimpleLogger = SimpleLogger;

/// Level named by the `BATTLESHIP_LOG` environment variable, if valid.
pub fn env_level() -> Option<LevelFilter> {
    env::var(LOG_ENV_VAR).ok().and_then(|lvl| lvl.parse().ok())
}

/// Install the stderr logger.
///
/// `level` wins over `BATTLESHIP_LOG`, which wins over the `info` default.
/// Calling this twice keeps the first logger.
pub fn init_logging(level: Option<LevelFilter>) {
    let level = level.or_else(env_level).unwrap_or(LevelFilter::Info);
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(level));
}
