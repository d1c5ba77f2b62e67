use std::str::FromStr;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;
use crate::errors::ConfigError;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}";

/// Sets up the global logger, always to stdout and also to file if a path is given
///
/// # Arguments
///
/// * 'log_path' - optional path to a log file, it is appended to if it exists
/// * 'log_level' - root log level, e.g. 'info' or 'debug'
pub fn setup_logger(log_path: Option<&str>, log_level: &str) -> Result<(), ConfigError> {
    let level = LevelFilter::from_str(log_level)
        .map_err(|_| ConfigError(format!("unknown log level: {}", log_level)))?;

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    let mut builder = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)));
    let mut root = Root::builder().appender("stdout");

    if let Some(path) = log_path {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(path)?;

        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    let config = builder.build(root.build(level))?;
    log4rs::init_config(config)?;

    Ok(())
}
