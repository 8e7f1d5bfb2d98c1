//! `agentrelay status` — show configuration and provider status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use agentrelay_core::config::{get_config_path, load_config};
use agentrelay_core::utils::truncate_string;

/// Run the status command.
pub fn run(path: Option<&Path>) -> Result<()> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    let config = load_config(Some(&config_path));
    let agent = &config.agent;

    println!();
    println!("{}", "Agentrelay Status".cyan().bold());
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

    println!("  {:<18} {}", "Model:".bold(), agent.model);
    println!(
        "  {:<18} {} | max_tokens: {}",
        "Parameters:".bold(),
        format!("temp: {}", agent.temperature).dimmed(),
        format!("{}", agent.max_tokens).dimmed(),
    );
    println!(
        "  {:<18} {} | parallel: {} | summarized: {}",
        "Tool iterations:".bold(),
        agent.iteration_ceiling(),
        agent.parallel_tool_calls,
        agent.summarize_tools,
    );
    if let Some(prompt) = &agent.system_prompt {
        println!(
            "  {:<18} {}",
            "System prompt:".bold(),
            truncate_string(prompt, 60).dimmed()
        );
    }

    println!();
    let provider = &config.provider;
    let key_status = if provider.is_configured() {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    };
    println!("  {:<18} {}", "API key:".bold(), key_status);
    println!(
        "  {:<18} {}",
        "API base:".bold(),
        provider
            .api_base
            .as_deref()
            .unwrap_or("https://api.openai.com/v1 (default)")
    );
    println!();

    Ok(())
}
