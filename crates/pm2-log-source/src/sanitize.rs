//! Cleanup of raw pm2 output lines.

use regex::Regex;
use std::sync::OnceLock;

static ANSI_RE: OnceLock<Regex> = OnceLock::new();
static HEADER_RE: OnceLock<Regex> = OnceLock::new();

/// Strips ANSI escape sequences and the pm2 `N|app |` line header, then
/// trims trailing whitespace. May return an empty string.
pub fn sanitize_line(line: &str) -> String {
    let ansi = ANSI_RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid regex"));
    let header = HEADER_RE.get_or_init(|| Regex::new(r"^\s*\d+\|[^|]*\|\s?").expect("valid regex"));

    let without_ansi = ansi.replace_all(line, "");
    header.replace(&without_ansi, "").trim_end().to_string()
}
