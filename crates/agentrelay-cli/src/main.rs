//! Agentrelay CLI — entry point.
//!
//! # Commands
//!
//! - `agentrelay message -m TEXT [--history FILE]` — run one session over a conversation
//! - `agentrelay trigger NAME [--payload JSON]` — run one session opened by an event
//! - `agentrelay init` — write a default config file
//! - `agentrelay status` — show configuration and provider status

mod helpers;
mod onboard;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use agentrelay_agent::{
    HandlerContext, MessageHandler, OrchestratorSettings, SessionOrchestrator, ToolAggregator, TracingLogger,
    TriggerEvent, TriggerHandler,
};
use agentrelay_core::config::{load_config, Config};
use agentrelay_core::utils::expand_home;
use agentrelay_providers::HttpProvider;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Agentrelay — drive an LLM tool-calling session from the command line
#[derive(Parser)]
#[command(name = "agentrelay", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.agentrelay/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a message (optionally continuing a saved history)
    Message {
        /// Latest user message
        #[arg(short, long)]
        message: Option<String>,

        /// JSON file with earlier turns: [{"role": ..., "content": ...}]
        #[arg(long)]
        history: Option<PathBuf>,

        /// Print the raw JSON response
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Run a session opened by a named trigger event
    Trigger {
        /// Trigger name
        name: String,

        /// Event payload (JSON, or plain text)
        #[arg(short, long)]
        payload: Option<String>,

        /// Print the raw JSON response
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Write a default configuration file
    Init,

    /// Show configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(|p| expand_home(&p.to_string_lossy()));
    let config_path = config_path.as_deref();

    match cli.command {
        Commands::Message {
            message,
            history,
            json,
            logs,
        } => {
            init_logging(logs);
            let history = helpers::build_history(history.as_deref(), message)?;
            let handler = MessageHandler::new(build_orchestrator(&load_config(config_path))?);
            let response = handler.handle(history, handler_context()).await;
            helpers::print_response(&response, json)
        }
        Commands::Trigger {
            name,
            payload,
            json,
            logs,
        } => {
            init_logging(logs);
            let event = TriggerEvent::new(name, helpers::parse_payload(payload.as_deref()));
            let handler = TriggerHandler::new(build_orchestrator(&load_config(config_path))?);
            let response = handler.handle(event, handler_context()).await;
            helpers::print_response(&response, json)
        }
        Commands::Init => onboard::run(config_path),
        Commands::Status => status::run(config_path),
    }
}

// ─────────────────────────────────────────────
// Composition
// ─────────────────────────────────────────────

/// Build the shared orchestrator from the loaded configuration.
pub fn build_orchestrator(config: &Config) -> Result<Arc<SessionOrchestrator>> {
    if !config.provider.is_configured() {
        warn!("no API key configured; backend calls will likely be rejected");
    }

    let provider = HttpProvider::new(&config.provider, &config.agent.model)
        .context("failed to create model provider")?;
    let settings = OrchestratorSettings::from_defaults(&config.agent);

    info!(
        model = %settings.model,
        max_tool_iterations = settings.max_tool_iterations,
        parallel = settings.parallel_tool_calls,
        "orchestrator initialized"
    );

    let orchestrator = SessionOrchestrator::new(Arc::new(provider), ToolAggregator::new(), settings)
        .with_logger(Arc::new(TracingLogger));
    Ok(Arc::new(orchestrator))
}

/// Per-dispatch context; Ctrl-C cancels the running session.
fn handler_context() -> HandlerContext {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    HandlerContext::new().with_cancellation(cancel)
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("agentrelay=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_trigger_with_payload() {
        let cli = Cli::try_parse_from(["agentrelay", "trigger", "daily", "-p", r#"{"n":1}"#, "--json"]).unwrap();
        match cli.command {
            Commands::Trigger { name, payload, json, .. } => {
                assert_eq!(name, "daily");
                assert_eq!(payload.as_deref(), Some(r#"{"n":1}"#));
                assert!(json);
            }
            _ => panic!("expected trigger command"),
        }
    }

    #[test]
    fn test_build_orchestrator_from_defaults() {
        let orchestrator = build_orchestrator(&Config::default()).unwrap();
        assert_eq!(orchestrator.settings().model, "gpt-4o-mini");
        assert!(orchestrator.tools().is_empty());
    }
}
