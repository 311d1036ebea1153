use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use chatbot_core::{ChatSession, Config, OpenRouterClient};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use logging::LogTarget;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "chatbot")]
#[command(author, version, about = "Chat with a hosted LLM from the terminal", long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model identifier sent with each request
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Chat completions endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log file for the interactive UI
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the answer
    Ask {
        /// Your question
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Show or change saved settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Save a setting: api_key, model, endpoint or timeout_secs
    Set { key: String, value: String },
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let target = match cli.command {
        None => LogTarget::File(cli.log_file.clone().unwrap_or_else(logging::default_log_path)),
        Some(_) => LogTarget::Stderr,
    };
    logging::init(target, cli.verbose)?;

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::get_config_path()?,
    };

    match cli.command {
        None => {
            let config = effective_config(&config_path, cli.model, cli.endpoint)?;
            run_tui(&config).await
        }
        Some(Commands::Ask { question }) => {
            let config = effective_config(&config_path, cli.model, cli.endpoint)?;
            ask(&config, &question.join(" ")).await
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => {
                let config = effective_config(&config_path, cli.model, cli.endpoint)?;
                show_config(&config, &config_path);
                Ok(())
            }
            ConfigAction::Set { key, value } => set_config(&config_path, &key, &value),
            ConfigAction::Path => {
                println!("{}", config_path.display());
                Ok(())
            }
        },
    }
}

/// File settings, then environment API key, then command-line overrides
fn effective_config(
    path: &Path,
    model: Option<String>,
    endpoint: Option<String>,
) -> Result<Config> {
    let mut config = Config::load_from(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.apply_env_api_key(|name| std::env::var(name).ok());

    if model.is_some() {
        config.model = model;
    }
    if endpoint.is_some() {
        config.endpoint = endpoint;
    }

    if !config.has_api_key() {
        warn!("no API key configured; set OPENROUTER_API_KEY or run `chatbot config set api_key <key>`");
    }

    Ok(config)
}

async fn run_tui(config: &Config) -> Result<()> {
    let client = OpenRouterClient::from_config(config)?;
    info!(model = client.model(), endpoint = client.endpoint(), "starting chat");

    let mut app = App::new(Arc::new(client), config.model());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            if let Some(event) = events.next().await {
                handler::handle_event(&mut app, event);
            }
            app.poll_query().await;
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    app.shutdown();
    tui::restore()?;
    result
}

async fn ask(config: &Config, question: &str) -> Result<()> {
    let client = OpenRouterClient::from_config(config)?;
    let mut session = ChatSession::new();
    session.set_prompt(question);

    if !session.submit(&client).await {
        bail!("Question is empty");
    }

    if let Some(answer) = session.conversation().last() {
        println!("{}", answer.content);
    }
    Ok(())
}

fn show_config(config: &Config, path: &Path) {
    println!("Config file: {}", path.display());
    println!("Endpoint:    {}", config.endpoint());
    println!("Model:       {}", config.model());
    println!("API key:     {}", config.masked_api_key());
    match config.timeout_secs {
        Some(secs) => println!("Timeout:     {}s", secs),
        None => println!("Timeout:     none"),
    }
}

/// Update one setting in the file itself, leaving environment overrides out of it
fn set_config(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_from(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.set(key, value)?;
    config
        .save_to(path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    println!("Saved {} to {}", key, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_ask_with_overrides() {
        let cli = Cli::try_parse_from(["chatbot", "ask", "--model", "x/y", "what", "is", "rust"]).unwrap();
        assert_eq!(cli.model.as_deref(), Some("x/y"));
        match cli.command {
            Some(Commands::Ask { question }) => assert_eq!(question.join(" "), "what is rust"),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_cli_without_subcommand_runs_tui() {
        let cli = Cli::try_parse_from(["chatbot"]).unwrap();
        assert!(cli.command.is_none());
        assert!(Cli::try_parse_from(["chatbot", "ask"]).is_err());
    }

    #[test]
    fn test_set_config_writes_file_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        set_config(&path, "model", "openai/gpt-4o-mini").unwrap();
        set_config(&path, "api_key", "sk-or-secret").unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.model(), "openai/gpt-4o-mini");
        assert_eq!(saved.api_key.as_deref(), Some("sk-or-secret"));
        assert!(set_config(&path, "nonsense", "1").is_err());
    }

    #[test]
    fn test_cli_overrides_win_over_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        set_config(&path, "model", "from/file").unwrap();

        let config = effective_config(&path, Some("from/cli".to_string()), None).unwrap();
        assert_eq!(config.model(), "from/cli");

        let config = effective_config(&path, None, Some("http://localhost:9/v1".to_string())).unwrap();
        assert_eq!(config.model(), "from/file");
        assert_eq!(config.endpoint(), "http://localhost:9/v1");
    }
}
