//! Terminal output for the `sharesync` commands
//!
//! Every status line carries a [`LogLevel`], the same severity the audit
//! log uses, so log entries and command messages render alike. Structured
//! documents (`--json` results) go to stdout; JSON status lines go to stderr
//! so stdout stays a single parseable document.

use std::io::Write;

use sharesync_core::domain::{LogEntry, LogLevel};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Renders status lines and documents for one output format
pub trait OutputFormatter {
    /// Writes one status line at `level`
    fn line(&self, level: LogLevel, message: &str);

    /// Writes one audit log entry
    fn entry(&self, entry: &LogEntry);

    /// Writes a structured result document
    fn print_json(&self, value: &serde_json::Value);

    fn success(&self, message: &str) {
        self.line(LogLevel::Success, message);
    }
    fn error(&self, message: &str) {
        self.line(LogLevel::Error, message);
    }
    fn warn(&self, message: &str) {
        self.line(LogLevel::Warning, message);
    }
    fn info(&self, message: &str) {
        self.line(LogLevel::Info, message);
    }
}

fn glyph(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Info => " ",
        LogLevel::Success => "\u{2713}",
        LogLevel::Warning => "\u{26a0}",
        LogLevel::Error => "\u{2717}",
    }
}

/// Problems go to stderr, everything else to stdout
fn is_problem(level: LogLevel) -> bool {
    matches!(level, LogLevel::Warning | LogLevel::Error)
}

/// Human-readable lines prefixed with a severity glyph
pub struct HumanFormatter;

impl HumanFormatter {
    fn render_line(level: LogLevel, message: &str) -> String {
        match level {
            LogLevel::Error => format!("{} Error: {message}", glyph(level)),
            LogLevel::Warning => format!("{} Warning: {message}", glyph(level)),
            _ => format!("{} {message}", glyph(level)),
        }
    }

    fn render_entry(entry: &LogEntry) -> String {
        format!(
            "{} [{}] {}",
            glyph(entry.level()),
            entry.timestamp().format("%H:%M:%S"),
            entry.message()
        )
    }

    fn emit(level: LogLevel, text: &str) {
        if is_problem(level) {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn line(&self, level: LogLevel, message: &str) {
        Self::emit(level, &Self::render_line(level, message));
    }

    fn entry(&self, entry: &LogEntry) {
        Self::emit(entry.level(), &Self::render_entry(entry));
    }

    fn print_json(&self, _value: &serde_json::Value) {}
}

/// One JSON object per status line or log entry
pub struct JsonFormatter;

impl JsonFormatter {
    fn render_line(level: LogLevel, message: &str) -> serde_json::Value {
        serde_json::json!({ "level": level, "message": message })
    }

    fn render_entry(entry: &LogEntry) -> serde_json::Value {
        serde_json::to_value(entry).unwrap_or_else(|_| Self::render_line(entry.level(), entry.message()))
    }
}

impl OutputFormatter for JsonFormatter {
    fn line(&self, level: LogLevel, message: &str) {
        // Spacer lines are dropped
        if message.is_empty() {
            return;
        }
        eprintln!("{}", Self::render_line(level, message));
    }

    fn entry(&self, entry: &LogEntry) {
        eprintln!("{}", Self::render_entry(entry));
    }

    fn print_json(&self, value: &serde_json::Value) {
        let mut stdout = std::io::stdout().lock();
        let _ = serde_json::to_writer_pretty(&mut stdout, value);
        let _ = writeln!(stdout);
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter),
    }
}

/// Prints audit log entries in order
pub fn print_log_entries(formatter: &dyn OutputFormatter, entries: &[LogEntry]) {
    for entry in entries {
        formatter.entry(entry);
    }
}

/// Formats a byte count for listings
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1536), "1.5 KiB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn test_human_lines_carry_level_glyph() {
        assert_eq!(
            HumanFormatter::render_line(LogLevel::Success, "Sync succeeded"),
            "\u{2713} Sync succeeded"
        );
        assert_eq!(
            HumanFormatter::render_line(LogLevel::Error, "lftp not found"),
            "\u{2717} Error: lftp not found"
        );
        assert_eq!(
            HumanFormatter::render_line(LogLevel::Warning, "stopping"),
            "\u{26a0} Warning: stopping"
        );
        assert_eq!(HumanFormatter::render_line(LogLevel::Info, "Log:"), "  Log:");
        assert!(is_problem(LogLevel::Error));
        assert!(!is_problem(LogLevel::Success));
    }

    #[test]
    fn test_human_entry_shows_time_and_glyph() {
        let stamp = Utc.with_ymd_and_hms(2024, 3, 15, 9, 5, 7).unwrap();
        let entry = LogEntry::with_timestamp("Sync completed", LogLevel::Success, stamp);
        assert_eq!(
            HumanFormatter::render_entry(&entry),
            "\u{2713} [09:05:07] Sync completed"
        );
    }

    #[test]
    fn test_json_entry_keeps_level_and_timestamp() {
        let stamp = Utc.with_ymd_and_hms(2024, 3, 15, 9, 5, 7).unwrap();
        let entry = LogEntry::with_timestamp("Sync stop requested", LogLevel::Warning, stamp);

        let value = JsonFormatter::render_entry(&entry);

        assert_eq!(value["level"], "warning");
        assert_eq!(value["message"], "Sync stop requested");
        assert!(value["timestamp"].as_str().unwrap().starts_with("2024-03-15T09:05:07"));
        assert_eq!(
            JsonFormatter::render_line(LogLevel::Error, "boom"),
            serde_json::json!({ "level": "error", "message": "boom" })
        );
    }

    #[test]
    fn test_get_formatter_variants() {
        for format in [OutputFormat::Human, OutputFormat::Json] {
            let formatter = get_formatter(format);
            formatter.info("");
            formatter.success("done");
            formatter.print_json(&serde_json::json!({"ok": true}));
        }
    }
}
