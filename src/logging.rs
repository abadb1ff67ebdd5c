use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

use crate::error::{Error, Result};

static PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} {t} - {m}{n}";

/// Routes all logging to a file; the terminal belongs to the UI.
pub fn init(path: &Path, level: LevelFilter) -> Result<log4rs::Handle> {
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file)))
        .build(Root::builder().appender("file").build(level))
        .map_err(|e| Error::Logging(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| Error::Logging(e.to_string()))
}
