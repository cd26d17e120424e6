//! Terminal output utilities: ANSI notes and the validation report table.

use gamegate_config::{ConfigValidationError, ValidationReport};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

/// Render errors then warnings as a `LEVEL  PATH  MESSAGE` table.
pub fn report_table(report: &ValidationReport) -> String {
    let rows: Vec<(&str, &ConfigValidationError)> = report
        .errors
        .iter()
        .map(|e| ("error", e))
        .chain(report.warnings.iter().map(|w| ("warning", w)))
        .collect();

    let level_width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0).max("LEVEL".len());
    let path_width = rows
        .iter()
        .map(|(_, e)| e.path.len())
        .max()
        .unwrap_or(0)
        .max("PATH".len());

    let mut out = format!(
        "  {:<level_width$}  {:<path_width$}  MESSAGE\n",
        "LEVEL", "PATH"
    );
    out.push_str(&format!(
        "  {}  {}  {}\n",
        "-".repeat(level_width),
        "-".repeat(path_width),
        "-".repeat("MESSAGE".len())
    ));
    for (level, entry) in rows {
        out.push_str(&format!(
            "  {:<level_width$}  {:<path_width$}  {}\n",
            level, entry.path, entry.message
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, message: &str) -> ConfigValidationError {
        ConfigValidationError {
            path: path.into(),
            message: message.into(),
        }
    }

    #[test]
    fn table_lists_errors_before_warnings() {
        let report = ValidationReport {
            errors: vec![entry("supabase.url", "Supabase URL is required")],
            warnings: vec![entry("content.dir", "missing")],
        };
        let table = report_table(&report);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("LEVEL") && lines[0].contains("PATH"));
        assert!(lines[2].trim_start().starts_with("error"));
        assert!(lines[2].contains("supabase.url"));
        assert!(lines[3].trim_start().starts_with("warning"));
    }

    #[test]
    fn columns_align() {
        let report = ValidationReport {
            errors: vec![entry("a", "x"), entry("content.games[0]", "y")],
            warnings: vec![],
        };
        let table = report_table(&report);
        let offsets: Vec<usize> = table
            .lines()
            .skip(2)
            .map(|l| l.rfind(' ').unwrap())
            .collect();
        assert_eq!(offsets[0], offsets[1]);
    }
}
