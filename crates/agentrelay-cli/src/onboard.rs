//! `agentrelay init` — write a default configuration file.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use agentrelay_core::config::{get_config_path, load_config, save_config};

/// Run the init command.
pub fn run(path: Option<&Path>) -> Result<()> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    println!();
    println!("{}", "Agentrelay — Setup".cyan().bold());
    println!();

    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        // Defaults plus whatever the environment already provides.
        let config = load_config(Some(&config_path));
        save_config(&config, Some(&config_path))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!(
        "{}",
        "  Set provider.apiKey, then run `agentrelay message -m \"Hello\"`.".green()
    );
    println!();

    Ok(())
}
