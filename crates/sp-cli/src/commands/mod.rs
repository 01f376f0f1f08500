//! CLI subcommand implementations.

pub mod assignment;
pub mod export;
pub mod holidays;
pub mod module;
pub mod plan;
pub mod settings;

/// Truncates by characters, not bytes, to avoid panics on multi-byte UTF-8.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{}...", text.chars().take(width - 3).collect::<String>())
    } else {
        text.to_string()
    }
}
