use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

static CONSOLE_LOGGER: Lazy<ConsoleLogger> = Lazy::new(ConsoleLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::default())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let max_level = config.min_level;
    CONSOLE_LOGGER.update_config(config)?;

    log::set_logger(&*CONSOLE_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(max_level);
    Ok(())
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Trace => Color::Cyan,
        Level::Debug => Color::Blue,
        Level::Info => Color::Green,
        Level::Warn => Color::Yellow,
        Level::Error => Color::Red,
    }
}

fn level_emoji(level: Level) -> &'static str {
    match level {
        Level::Trace => "🔍",
        Level::Debug => "🐛",
        Level::Info => "💡",
        Level::Warn => "⚠️",
        Level::Error => "❌",
    }
}

/// One line of JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl LogLine {
    fn from_record(record: &Record) -> Self {
        let location = match (record.file(), record.line()) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            _ => None,
        };
        Self {
            timestamp: Utc::now(),
            level: record.level().as_str().to_string(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            location,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LevelFilter,
    pub show_colors: bool,
    pub show_emojis: bool,
    pub show_target: bool,
    pub show_file_location: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub log_file_path: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LevelFilter::Info,
            show_colors: true,
            show_emojis: true,
            show_target: true,
            show_file_location: false,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
            log_file_path: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_file_path = Some(path.to_string());
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    /// `PIXGEN_LOG` picks the level (`trace`..`error`);
    /// `PIXGEN_LOG_JSON=true` switches to JSON lines.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(level) = std::env::var("PIXGEN_LOG")
            .ok()
            .and_then(|s| s.parse::<LevelFilter>().ok())
        {
            config.min_level = level;
        }
        if std::env::var("PIXGEN_LOG_JSON").map_or(false, |v| v == "true") {
            config.output_json = true;
            config.show_colors = false;
        }
        config
    }

    pub fn production() -> Self {
        Self {
            min_level: LevelFilter::Info,
            show_colors: false,
            show_emojis: false,
            output_json: true,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LevelFilter::Debug,
            show_file_location: true,
            ..Default::default()
        }
    }
}

/// Colourful `log` backend writing to stderr and, optionally, a file.
pub struct ConsoleLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
}

impl ConsoleLogger {
    fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
        }
    }

    fn config(&self) -> MutexGuard<'_, LoggerConfig> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_config(&self, new_config: LoggerConfig) -> Result<(), String> {
        let file = match &new_config.log_file_path {
            Some(path) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| format!("Failed to open log file {}: {}", path, e))?,
            ),
            None => None,
        };
        *self.log_file.lock().unwrap_or_else(PoisonError::into_inner) = file;
        *self.config() = new_config;
        Ok(())
    }

    fn format_line(&self, line: &LogLine, level: Level, config: &LoggerConfig) -> String {
        if config.output_json {
            return serde_json::to_string(line).unwrap_or_default();
        }

        let paint = |text: String, f: fn(ColoredString) -> ColoredString| {
            if config.show_colors {
                f(text.normal()).to_string()
            } else {
                text
            }
        };

        let mut out = String::new();
        out.push_str(&paint(
            line.timestamp.format(&config.timestamp_format).to_string(),
            |s| s.bright_black(),
        ));
        out.push(' ');

        let label = if config.show_emojis {
            format!("{} {}", level_emoji(level), line.level)
        } else {
            line.level.clone()
        };
        if config.show_colors {
            out.push_str(&format!("[{}] ", label.color(level_color(level)).bold()));
        } else {
            out.push_str(&format!("[{}] ", label));
        }

        if config.show_target && !line.target.is_empty() {
            out.push_str(&paint(format!("{}::", line.target), |s| s.bright_blue()));
        }

        out.push_str(&line.message);

        if config.show_file_location {
            if let Some(location) = &line.location {
                out.push_str(&paint(format!(" ({})", location), |s| s.bright_black()));
            }
        }

        out
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.config().min_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let config = self.config().clone();
        let line = LogLine::from_record(record);
        let text = self.format_line(&line, record.level(), &config);
        eprintln!("{}", text);

        if let Some(file) = self
            .log_file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            let plain = if config.output_json {
                text
            } else {
                self.format_line(&line, record.level(), &config.clone().with_colors(false))
            };
            let _ = writeln!(file, "{}", plain);
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Some(file) = self
            .log_file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            let _ = file.flush();
        }
    }
}

/// Logs the elapsed time of a scope when dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::debug!(
            "⏱️  '{}' finished in {}ms",
            self.name,
            self.elapsed().as_millis()
        );
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_config_info(config: &crate::config::ClientConfig) {
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Backend: {}", config.base_url());
    log::info!(
        "   Token: {}",
        if config.token.is_some() { "✅" } else { "❌" }
    );
    log::info!("   Download dir: {}", config.download_dir.display());
    log::info!("   Default format: {}", config.default_format);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_line() -> LogLine {
        LogLine {
            timestamp: Utc::now(),
            level: "INFO".to_string(),
            target: "pixgen::export".to_string(),
            message: "Converted image".to_string(),
            location: Some("src/export/mod.rs:42".to_string()),
        }
    }

    #[test]
    fn test_levels() {
        assert_eq!(level_emoji(Level::Error), "❌");
        assert_eq!(level_color(Level::Debug), Color::Blue);
    }

    #[test]
    fn test_presets() {
        let dev = LoggerConfig::development();
        assert_eq!(dev.min_level, LevelFilter::Debug);
        assert!(dev.show_colors);

        let prod = LoggerConfig::production();
        assert!(!prod.show_colors);
        assert!(prod.output_json);
    }

    #[test]
    fn test_plain_format() {
        let logger = ConsoleLogger::new();
        let config = LoggerConfig::new()
            .with_colors(false)
            .with_level(LevelFilter::Trace);
        let config = LoggerConfig {
            show_emojis: false,
            show_file_location: true,
            ..config
        };

        let text = logger.format_line(&sample_line(), Level::Info, &config);
        assert!(text.contains("[INFO] pixgen::export::Converted image"));
        assert!(text.ends_with("(src/export/mod.rs:42)"));
    }

    #[test]
    fn test_json_format() {
        let logger = ConsoleLogger::new();
        let text = logger.format_line(&sample_line(), Level::Info, &LoggerConfig::production());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["message"], "Converted image");
    }
}
