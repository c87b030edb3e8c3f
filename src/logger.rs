use chrono::{DateTime, Utc};
use colored::*;
use log::kv::{self, Key, Value, VisitSource};
use log::{Level, Metadata, Record};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

static GENIE_LOGGER: Lazy<GenieLogger> = Lazy::new(GenieLogger::new);

/// Set while the spinner owns the current stderr line.
static LIVE_LINE: AtomicBool = AtomicBool::new(false);

/// Carriage return plus "erase line".
pub const CLEAR_LINE: &str = "\r\x1b[2K";

/// Key-value field that `LogEntry` lifts out of `context`.
pub const DURATION_KEY: &str = "duration_ms";

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::default())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let max_level = config.min_level.to_log_level_filter();
    GENIE_LOGGER.update_config(config);

    log::set_logger(&*GENIE_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(max_level);
    Ok(())
}

/// Tells the logger that an unterminated status line is on stderr, so each
/// record wipes it before printing.
pub fn set_live_line(active: bool) {
    LIVE_LINE.store(active, Ordering::SeqCst);
}

pub fn live_line_active() -> bool {
    LIVE_LINE.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Trace => "🔍",
            LogLevel::Debug => "🐛",
            LogLevel::Info => "💡",
            LogLevel::Warn => "⚠️",
            LogLevel::Error => "❌",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_log_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::Trace,
            LogLevel::Debug => Level::Debug,
            LogLevel::Info => Level::Info,
            LogLevel::Warn => Level::Warn,
            LogLevel::Error => Level::Error,
        }
    }

    pub fn to_log_level_filter(&self) -> log::LevelFilter {
        self.to_log_level().to_level_filter()
    }

    pub fn from_log_level(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

/// One log record with its structured fields. Also the JSON line shape.
///
/// Key-value pairs attached at the call site (`log::info!(request_id = id; ...)`)
/// land in `context`, except `duration_ms`, which `Timer` sets.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub module: String,
    pub file: String,
    pub line: u32,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl LogEntry {
    pub fn from_record(record: &Record) -> Self {
        let mut entry = Self {
            timestamp: Utc::now(),
            level: LogLevel::from_log_level(record.level()),
            message: record.args().to_string(),
            module: record.module_path().unwrap_or("unknown").to_string(),
            file: record.file().unwrap_or("unknown").to_string(),
            line: record.line().unwrap_or(0),
            context: BTreeMap::new(),
            duration_ms: None,
        };
        // A malformed pair only loses that field.
        let _ = record
            .key_values()
            .visit(&mut FieldCollector { entry: &mut entry });
        entry
    }
}

struct FieldCollector<'a> {
    entry: &'a mut LogEntry,
}

impl<'kvs> VisitSource<'kvs> for FieldCollector<'_> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        if key.as_str() == DURATION_KEY {
            if let Some(ms) = value.to_u64() {
                self.entry.duration_ms = Some(ms);
                return Ok(());
            }
        }
        self.entry
            .context
            .insert(key.as_str().to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_emojis: bool,
    pub show_file_location: bool,
    pub show_module: bool,
    pub include_timestamp: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub log_to_file: bool,
    pub log_file_path: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_emojis: true,
            show_file_location: false,
            show_module: true,
            include_timestamp: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
            log_to_file: false,
            log_file_path: "pixel-genie.log".to_string(),
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_file_location(mut self, enabled: bool) -> Self {
        self.show_file_location = enabled;
        self
    }

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_to_file = true;
        self.log_file_path = path.to_string();
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }
}

fn paint(text: &str, colors: bool, style: impl Fn(&str) -> ColoredString) -> String {
    if colors {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

/// Renders the human-readable form of `entry`.
pub fn format_line(entry: &LogEntry, config: &LoggerConfig, colors: bool) -> String {
    let mut parts = Vec::new();

    if config.include_timestamp {
        let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
        parts.push(paint(&timestamp, colors, |s| s.bright_black()));
    }

    let level = if config.show_emojis {
        format!("[{} {}]", entry.level.emoji(), entry.level.as_str())
    } else {
        format!("[{}]", entry.level.as_str())
    };
    parts.push(paint(&level, colors, |s| s.color(entry.level.color()).bold()));

    if config.show_module && !entry.module.is_empty() {
        parts.push(paint(&format!("{}:", entry.module), colors, |s| s.bright_blue()));
    }

    parts.push(paint(&entry.message, colors, |s| s.white().bold()));

    if !entry.context.is_empty() {
        let context = serde_json::to_string(&entry.context).unwrap_or_default();
        parts.push(paint(&context, colors, |s| s.bright_cyan()));
    }

    if let Some(ms) = entry.duration_ms {
        parts.push(paint(&format!("[{}ms]", ms), colors, |s| s.bright_magenta()));
    }

    if config.show_file_location {
        let location = format!("({}:{})", entry.file, entry.line);
        parts.push(paint(&location, colors, |s| s.bright_black()));
    }

    parts.join(" ")
}

/// What actually goes to stderr: the line, preceded by a wipe of the
/// spinner's line when one is showing.
pub fn stderr_line(line: &str, live_line: bool) -> String {
    if live_line {
        format!("{}{}", CLEAR_LINE, line)
    } else {
        line.to_string()
    }
}

/// `log` backend writing to stderr, and optionally a file, so that rendered
/// output on stdout stays clean.
pub struct GenieLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
}

impl GenieLogger {
    fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
        }
    }

    pub fn update_config(&self, new_config: LoggerConfig) {
        let file = if new_config.log_to_file {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&new_config.log_file_path)
                .map_err(|e| eprintln!("Cannot open {}: {}", new_config.log_file_path, e))
                .ok()
        } else {
            None
        };

        if let Ok(mut log_file) = self.log_file.lock() {
            *log_file = file;
        }
        if let Ok(mut config) = self.config.lock() {
            *config = new_config;
        }
    }

    fn append_to_file(&self, line: &str) {
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = writeln!(file, "{}", line);
            }
        }
    }
}

impl log::Log for GenieLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.lock() {
            Ok(config) => metadata.level() <= config.min_level.to_log_level(),
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Ok(config) = self.config.lock() else {
            return;
        };
        let entry = LogEntry::from_record(record);

        let (console, plain) = if config.output_json {
            let json = serde_json::to_string(&entry).unwrap_or_default();
            (json.clone(), json)
        } else {
            (
                format_line(&entry, &config, config.show_colors),
                format_line(&entry, &config, false),
            )
        };

        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{}", stderr_line(&console, live_line_active()));

        if config.log_to_file {
            self.append_to_file(&plain);
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Logs how long one step of a request took when dropped. The request id
/// and elapsed milliseconds travel as structured fields.
pub struct Timer {
    start: Instant,
    name: String,
    request_id: String,
}

impl Timer {
    pub fn new(name: &str, request_id: &str) -> Self {
        log::debug!(request_id = request_id; "⏱️  Starting {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
            request_id: request_id.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration_ms = self.elapsed().as_millis() as u64;
        log::info!(
            request_id = self.request_id.as_str(), duration_ms = duration_ms;
            "⏱️  {} completed",
            self.name
        );
    }
}

pub fn timer(name: &str, request_id: &str) -> Timer {
    Timer::new(name, request_id)
}

pub fn log_startup_info(app_name: &str, version: &str) {
    log::info!("🚀 Starting {} v{}", app_name, version);
    log::info!("📝 Logger initialized successfully");
}

pub fn log_config_info(config: &crate::config::Config) {
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Backend: {}", config.backend);
    match config.backend {
        crate::config::Backend::Gemini => {
            log::info!("   Text model: {}", config.gemini.text_model);
            log::info!("   Image model: {}", config.gemini.image_model);
            log::info!(
                "   API key: {}",
                if config.gemini.api_key.is_some() { "✅" } else { "❌" }
            );
        }
        crate::config::Backend::Bedrock => {
            log::info!("   Region: {}", config.bedrock.region_or_default());
            log::info!("   Text model: {}", config.bedrock.text_model);
            log::info!("   Image model: {}", config.bedrock.image_model);
            log::info!(
                "   Explicit credentials: {}",
                if config.bedrock.access_key.is_some() { "✅" } else { "❌" }
            );
        }
    }
    log::info!("   Output directory: {}", config.output_dir.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_config() -> LoggerConfig {
        LoggerConfig {
            show_emojis: false,
            include_timestamp: false,
            show_file_location: true,
            ..LoggerConfig::default()
        }
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(LogLevel::Info.as_str(), "INFO");
        assert_eq!(LogLevel::Error.emoji(), "❌");
        assert_eq!(LogLevel::Debug.color(), Color::Blue);
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
        assert_eq!(
            LogLevel::Trace.to_log_level_filter(),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_logger_config() {
        let config = LoggerConfig::new()
            .with_level(LogLevel::Debug)
            .with_json_output(true)
            .with_colors(false)
            .with_file_output("genie.log");
        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(config.output_json);
        assert!(!config.show_colors);
        assert!(config.log_to_file);
        assert_eq!(config.log_file_path, "genie.log");
    }

    #[test]
    fn test_record_fields_become_context_and_duration() {
        let pairs = [
            ("request_id", Value::from("abc")),
            (DURATION_KEY, Value::from(1500u64)),
        ];
        let fields: &[(&str, Value)] = &pairs;
        let entry = LogEntry::from_record(
            &Record::builder()
                .args(format_args!("slow response"))
                .level(Level::Warn)
                .module_path(Some("pixel_genie::gemini"))
                .file(Some("src/gemini/mod.rs"))
                .line(Some(42))
                .key_values(&fields)
                .build(),
        );

        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.context.get("request_id").map(String::as_str), Some("abc"));
        assert!(!entry.context.contains_key(DURATION_KEY));
        assert_eq!(entry.duration_ms, Some(1500));

        assert_eq!(
            format_line(&entry, &plain_config(), false),
            "[WARN] pixel_genie::gemini: slow response {\"request_id\":\"abc\"} [1500ms] (src/gemini/mod.rs:42)"
        );

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["context"]["request_id"], "abc");
        assert_eq!(json["duration_ms"], 1500);
    }

    #[test]
    fn test_plain_line_without_fields() {
        let entry = LogEntry::from_record(
            &Record::builder()
                .args(format_args!("ready"))
                .level(Level::Info)
                .module_path(Some("pixel_genie"))
                .file(Some("src/main.rs"))
                .line(Some(7))
                .build(),
        );
        let config = LoggerConfig {
            show_file_location: false,
            ..plain_config()
        };
        assert_eq!(format_line(&entry, &config, false), "[INFO] pixel_genie: ready");

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("context").is_none());
        assert!(json.get("duration_ms").is_none());
    }

    #[test]
    fn test_live_line_is_wiped_before_logging() {
        assert_eq!(stderr_line("[INFO] done", true), "\r\x1b[2K[INFO] done");
        assert_eq!(stderr_line("[INFO] done", false), "[INFO] done");
    }

    #[test]
    fn test_logger_initialization() {
        let config = LoggerConfig::new().with_level(LogLevel::Debug);
        assert!(init_with_config(config).is_ok());
        assert!(init().is_err());
    }
}
