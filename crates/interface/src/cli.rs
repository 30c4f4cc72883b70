//! CLI - Command Line Interface
//!
//! Available Commands:
//! - fusbuddy render [FILE]         - Render assistant markdown to HTML or text
//! - fusbuddy chat                  - Terminal palette session (offline coach)
//! - fusbuddy config show           - Show stored keys (masked) and active provider
//! - fusbuddy config set-key        - Store an API key
//! - fusbuddy config set-provider   - Set the preferred provider

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use fusbuddy_core::config::{self, ConfigError};
use fusbuddy_core::redaction::mask_api_key;
use fusbuddy_core::render::{SessionStepIds, blocks_to_html, blocks_to_plain, render};
use fusbuddy_core::{
    DesignContext, KeySource, LlmProvider, ProviderPreference, UserConfig, detect_provider,
};

/// CLI Errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot read {path}: {reason}")]
    Input { path: String, reason: String },

    #[error("Invalid context file {path}: {reason}")]
    InvalidContext { path: String, reason: String },

    #[error("Session error: {0}")]
    Session(String),
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Html,
    Text,
}

/// FusBuddy360 CLI
#[derive(Parser, Debug)]
#[command(name = "fusbuddy")]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding config.json
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Render assistant markdown from a file or stdin
    Render(RenderArgs),

    /// Start a terminal palette session
    Chat(ChatArgs),

    /// Manage API keys and provider preference
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// Markdown file (stdin when omitted)
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct ChatArgs {
    /// Design context JSON pushed before every reply
    #[arg(long)]
    pub context: Option<PathBuf>,

    /// Print log entries as HTML instead of text
    #[arg(long)]
    pub html: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ConfigCommand {
    /// Show stored keys (masked) and the active provider
    Show,

    /// Store an API key
    SetKey {
        /// openai or gemini
        #[arg(long)]
        provider: LlmProvider,

        /// The API key
        key: String,
    },

    /// Set the preferred provider (auto, openai, gemini)
    SetProvider {
        preference: String,
    },
}

/// Parse CLI arguments and execute commands
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt::init();
    }

    let config_path = match cli.config_dir {
        Some(dir) => dir.join(config::CONFIG_FILE_NAME),
        None => config::config_path()?,
    };

    match cli.command {
        Commands::Render(args) => cmd_render(args),
        Commands::Chat(args) => cmd_chat(args, config_path).await,
        Commands::Config(cmd) => cmd_config(cmd, &config_path),
    }
}

fn cmd_render(args: RenderArgs) -> Result<(), CliError> {
    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| CliError::Input {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CliError::Input {
                    path: "<stdin>".to_string(),
                    reason: e.to_string(),
                })?;
            buf
        }
    };
    println!("{}", render_text(&text, args.format));
    Ok(())
}

pub(crate) fn render_text(text: &str, format: OutputFormat) -> String {
    let blocks = render(text, &SessionStepIds::new());
    match format {
        OutputFormat::Html => blocks_to_html(&blocks),
        OutputFormat::Text => blocks_to_plain(&blocks),
    }
}

async fn cmd_chat(args: ChatArgs, config_path: PathBuf) -> Result<(), CliError> {
    let context = args.context.as_deref().map(load_context).transpose()?;
    info!("Starting chat session (config: {})", config_path.display());
    crate::repl::run_chat(config_path, context, args.html)
        .await
        .map_err(|e| CliError::Session(e.to_string()))
}

pub(crate) fn load_context(path: &Path) -> Result<DesignContext, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|e| CliError::Input {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| CliError::InvalidContext {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(DesignContext::from_value(&value))
}

fn cmd_config(cmd: ConfigCommand, config_path: &Path) -> Result<(), CliError> {
    match cmd {
        ConfigCommand::Show => {
            let cfg = UserConfig::load(config_path);
            println!("{}", describe_config(&cfg, config_path));
            Ok(())
        }
        ConfigCommand::SetKey { provider, key } => {
            let mut cfg = UserConfig::load(config_path);
            cfg.set_api_key(provider, &key);
            cfg.save(config_path)?;
            println!("Saved {} API key {}", provider, mask_api_key(key.trim()));
            Ok(())
        }
        ConfigCommand::SetProvider { preference } => {
            let mut cfg = UserConfig::load(config_path);
            cfg.llm_provider = ProviderPreference::parse(&preference);
            cfg.save(config_path)?;
            println!("Provider preference: {}", cfg.llm_provider.as_str());
            Ok(())
        }
    }
}

pub(crate) fn describe_config(cfg: &UserConfig, config_path: &Path) -> String {
    let mut lines = vec![
        format!("Config file: {}", config_path.display()),
        format!("Provider preference: {}", cfg.llm_provider.as_str()),
    ];
    for provider in [LlmProvider::Gemini, LlmProvider::OpenAi] {
        let stored = cfg
            .api_key(provider)
            .map(mask_api_key)
            .unwrap_or_else(|| "(not set)".to_string());
        lines.push(format!("  {provider} key: {stored}"));
    }
    let active = match detect_provider(cfg) {
        Some(resolved) => {
            let source = match &resolved.source {
                KeySource::Env(var) => format!("env {var}"),
                KeySource::ConfigFile => "config file".to_string(),
            };
            format!("{} ({}, {})", resolved.provider, resolved.preview(), source)
        }
        None => "none (offline replies only)".to_string(),
    };
    lines.push(format!("Active provider: {active}"));
    lines.join("\n")
}
