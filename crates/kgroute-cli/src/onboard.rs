//! `kgroute onboard` — initialize configuration and the OpenAI helper.
//!
//! - Creates `~/.kgroute/config.json` with defaults
//! - Drops a starter `openai_request.py` next to it for the OpenAI provider

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use kgroute_core::config::{save_config, Config};
use kgroute_core::utils::get_data_path;

/// File name the default `knowledge.helperCommand` points at.
const HELPER_SCRIPT: &str = "openai_request.py";

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔎 kgroute — Setup".cyan().bold());
    println!();

    setup(&get_data_path())?;

    println!();
    println!(
        "{}",
        "  Setup complete! Edit the config to pick a provider, then run `kgroute status`."
            .green()
    );
    println!();
    Ok(())
}

/// Create the config and helper script under `data_dir`, keeping existing files.
fn setup(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let config_path = data_dir.join("config.json");
    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        save_config(&Config::default(), Some(&config_path))
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    create_template(&data_dir.join(HELPER_SCRIPT), HELPER_TEMPLATE)
}

/// Create a template file if it doesn't exist.
fn create_template(path: &Path, content: &str) -> Result<()> {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    if path.exists() {
        println!("  {} {} already exists", "✓".green(), name);
    } else {
        std::fs::write(path, content)?;
        println!("  {} created {}", "✓".green(), name);
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Templates
// ─────────────────────────────────────────────

const HELPER_TEMPLATE: &str = r#"#!/usr/bin/env python3
# Answers one knowledge-graph question for kgroute.
#
# kgroute passes the transcribed question as the last argument and the API
# key in OPENAI_VECTOR_API_KEY. Print the answer on stdout; exit non-zero on
# failure.
import os
import sys

from openai import OpenAI

ROBOT_NAME = "Vector"


def main() -> int:
    question = sys.argv[-1] if len(sys.argv) > 1 else ""
    client = OpenAI(api_key=os.environ.get("OPENAI_VECTOR_API_KEY"))

    prompt = (
        f"You are a helpful robot called {ROBOT_NAME}. Answer the user's question. "
        "It may not be punctuated or spelled correctly. The answer will be spoken "
        f'aloud, so keep it short and plain. Question: "{question}"\nAnswer: '
    )
    response = client.completions.create(
        model="gpt-3.5-turbo-instruct",
        prompt=prompt,
        temperature=0.7,
        max_tokens=256,
    )
    print(response.choices[0].text.strip())
    return 0


if __name__ == "__main__":
    sys.exit(main())
"#;
