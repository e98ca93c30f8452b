//! Styling helpers for operator-facing console output.

use console::style;

pub fn header(text: &str) -> String {
    style(text).cyan().bold().to_string()
}

pub fn label(text: &str) -> String {
    style(text).white().bold().to_string()
}

pub fn entity(text: &str) -> String {
    style(text).green().to_string()
}

pub fn secondary(text: &str) -> String {
    style(text).dim().to_string()
}

pub fn success(text: &str) -> String {
    style(text).green().bold().to_string()
}

pub fn warning(text: &str) -> String {
    style(text).yellow().to_string()
}

pub fn error(text: &str) -> String {
    style(text).red().bold().to_string()
}
