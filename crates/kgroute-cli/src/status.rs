//! `kgroute status` — show knowledge graph configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use kgroute_core::config::{get_config_path, load_config, KnowledgeConfig, ProviderKind};
use kgroute_core::utils::expand_home;
use kgroute_router::ProviderSnapshot;

use crate::helpers::mark;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();
    let knowledge = &config.knowledge;

    println!();
    println!("{}", "🔎 kgroute Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );
    println!(
        "  {:<18} {}",
        "Knowledge graph:".bold(),
        if knowledge.enable {
            "enabled".green().to_string()
        } else {
            "disabled".yellow().to_string()
        }
    );
    println!("  {:<18} {}", "Provider:".bold(), knowledge.provider);
    println!(
        "  {:<18} {}",
        "Credentials:".bold(),
        mark(knowledge.has_credentials(), "(set)", credentials_hint(knowledge))
    );

    match knowledge.provider {
        ProviderKind::Together => {
            println!("  {:<18} {}", "Model:".bold(), knowledge.model);
        }
        ProviderKind::Openai => {
            println!(
                "  {:<18} {}",
                "Helper:".bold(),
                helper_line(&knowledge.helper_command)
            );
        }
        ProviderKind::Houndify | ProviderKind::None => {}
    }
    if let Some(base) = &knowledge.api_base {
        println!("  {:<18} {}", "Endpoint:".bold(), base);
    }
    println!(
        "  {:<18} {}",
        "Timeout:".bold(),
        format!("{}s", knowledge.timeout_secs).dimmed()
    );

    // What a request would actually hit right now
    let active = ProviderSnapshot::build(knowledge.clone()).selected();
    println!();
    println!(
        "  {:<18} {}",
        "Answering with:".bold(),
        if active == ProviderKind::None {
            "nothing (answers \"not enabled\")".dimmed().to_string()
        } else {
            active.to_string().green().to_string()
        }
    );

    if knowledge.provider.needs_transcript() {
        println!(
            "  {:<18} {} {}",
            "Transcription:".bold(),
            config.transcription.model,
            mark(
                !config.transcription.api_key.trim().is_empty(),
                "(key set)",
                "no API key, audio questions will fail"
            )
        );
    }

    println!();
    Ok(())
}

/// What is missing for the selected provider.
fn credentials_hint(knowledge: &KnowledgeConfig) -> &'static str {
    match knowledge.provider {
        ProviderKind::Houndify => "client id and client key required",
        ProviderKind::Openai | ProviderKind::Together => "API key required",
        ProviderKind::None => "no provider selected",
    }
}

/// Helper command line, flagging a script path that doesn't exist.
fn helper_line(command: &[String]) -> String {
    let line = command.join(" ");
    let missing = command
        .iter()
        .skip(1)
        .map(|arg| expand_home(arg))
        .find(|arg| arg.ends_with(".py") && !std::path::Path::new(arg).exists());

    match missing {
        Some(path) => format!("{line} {}", format!("({path} not found)").red()),
        None => line,
    }
}
