//! Shared CLI helpers — path expansion, answer printing, status markers.

use std::path::PathBuf;

use colored::Colorize;

use kgroute_core::types::NormalizedAnswer;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print an emitted answer to stdout.
pub fn print_answer(answer: &NormalizedAnswer) {
    println!();
    println!(
        "{} {}",
        "🔎 kgroute".cyan().bold(),
        format!("[{} · {}]", answer.device_id, answer.session).dimmed()
    );
    if answer.spoken_text.is_empty() {
        println!("{}", "(empty answer)".dimmed());
    } else {
        println!("{}", answer.spoken_text);
    }
    println!();
}

/// `✓ label` when `ok`, dimmed `· missing` otherwise.
pub fn mark(ok: bool, label: &str, missing: &str) -> String {
    if ok {
        format!("{} {}", "✓".green(), label)
    } else {
        format!("{}", format!("· {missing}").dimmed())
    }
}

/// Print a "thinking" placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ asking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
