//! Shared CLI helpers — input parsing and response printing.

use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::Value;

use agentrelay_agent::{DispatchResponse, InboundMessage};

/// Read a conversation history from a JSON file: `[{"role": ..., "content": ...}]`.
pub fn read_history(path: &Path) -> Result<Vec<InboundMessage>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read history file {}", path.display()))?;
    let history: Vec<InboundMessage> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid history JSON in {}", path.display()))?;
    Ok(history)
}

/// Assemble the history for the `message` command.
///
/// The `-m` text, when given, is appended as the latest user turn.
pub fn build_history(file: Option<&Path>, message: Option<String>) -> Result<Vec<InboundMessage>> {
    let mut history = match file {
        Some(path) => read_history(path)?,
        None => Vec::new(),
    };
    if let Some(text) = message {
        history.push(InboundMessage::new("user", text));
    }
    if history.is_empty() {
        bail!("nothing to send: pass --message or --history");
    }
    Ok(history)
}

/// Parse a trigger payload given on the command line.
///
/// Anything that is not valid JSON is sent as a plain string.
pub fn parse_payload(raw: Option<&str>) -> Value {
    match raw {
        None => Value::Null,
        Some(text) => serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())),
    }
}

/// Print a dispatch response to stdout.
pub fn print_response(response: &DispatchResponse, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    println!();
    if response.is_success() {
        println!("{}", "Agentrelay".cyan().bold());
    } else {
        println!(
            "{} {}",
            "Agentrelay".cyan().bold(),
            format!("({})", response.status.kind()).red()
        );
    }
    if response.content.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{}", response.content);
    }
    println!("{}", format!("{} tokens", response.used_token).dimmed());
    println!();
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
