use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::{self, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{fmt, EnvFilter};

use prpilot_core::error::GenerationFailure;
use prpilot_core::{
    validate, Config, Dispatcher, GenerateOptions, HttpRemoteService, Orchestrator, Prober, RawInput,
    TargetSystemKind,
};

mod app;
mod form;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

const LOG_ENV: &str = "PRPILOT_LOG";

#[derive(Parser)]
#[command(name = "prpilot", version)]
#[command(about = "Generate Kafka topic, Kong route and Gatekeeper route PRs")]
struct Cli {
    /// Base URL of the generation service (overrides config and PRPILOT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Never call the generation service; use the local templates only
    #[arg(long, global = true)]
    offline: bool,
    /// Path to an alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a PR from a JSON input file without the TUI
    Generate {
        /// kafka, kong or gatekeeper
        kind: String,
        /// JSON input file, or - for stdin
        #[arg(short, long)]
        input: String,
        /// Skip the generation service
        #[arg(long)]
        local: bool,
        /// Write the YAML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check whether the generation service is reachable
    Probe,
    /// Show the config file location and resolved settings
    Config {
        /// Also write the resolved settings to the config file
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        None => {
            init_file_logging();
            run_tui(config).await
        }
        Some(command) => {
            init_stderr_logging();
            match command {
                Commands::Generate {
                    kind,
                    input,
                    local,
                    output,
                } => generate(&config, kind, input, *local, output.as_deref()).await,
                Commands::Probe => probe(&config).await,
                Commands::Config { write } => show_config(&cli, &config, *write),
            }
        }
    }
}

/// File, then `PRPILOT_API_URL`, then flags.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env();
    config.apply_api_url_override(cli.api_url.clone());
    if cli.offline {
        config.remote_enabled = Some(false);
    }
    Ok(config)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// The terminal belongs to ratatui, so the TUI logs to a file.
fn init_file_logging() {
    let file = Config::config_dir().and_then(|dir| {
        fs::create_dir_all(&dir)?;
        Ok(OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("prpilot.log"))?)
    });

    if let Ok(file) = file {
        fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
}

async fn run_tui(config: Config) -> Result<()> {
    let orchestrator = Orchestrator::from_config(&config)?;
    let mut app = App::new(orchestrator, config.download_dir());
    tracing::info!(api = %config.api_base_url(), remote = config.remote_enabled(), "starting TUI");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(tui::TICK_RATE);
    app.start_probe();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read input file {}", input))
    }
}

async fn generate(
    config: &Config,
    kind: &str,
    input: &str,
    local: bool,
    output: Option<&Path>,
) -> Result<()> {
    let kind = TargetSystemKind::from_str(kind)
        .ok_or_else(|| GenerationFailure::UnsupportedKind(kind.to_string()))?;

    let value: serde_json::Value =
        serde_json::from_str(&read_input(input)?).context("Input is not valid JSON")?;
    let raw = RawInput::from_json(kind, value)
        .with_context(|| format!("Input does not describe a {}", kind.display_name()))?;
    let input = validate(&raw)?;

    let remote = HttpRemoteService::new(&config.api_base_url(), config.request_timeout())?;
    let dispatcher = Dispatcher::new(Arc::new(remote), config.request_timeout());
    let options = GenerateOptions {
        prefer_remote: !local && config.remote_enabled(),
    };
    let generation = dispatcher.generate(kind, &input, options).await?;
    if let Some(reason) = generation.fell_back() {
        eprintln!("Generation service failed ({}); used local templates", reason);
    }

    let result = generation.result;
    eprintln!("{}", result.title);
    match output {
        Some(path) => {
            fs::write(path, result.content.as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", result.content),
    }
    Ok(())
}

async fn probe(config: &Config) -> Result<()> {
    if !config.remote_enabled() {
        println!("offline (remote generation disabled)");
        return Ok(());
    }

    let url = config.api_base_url();
    let remote = HttpRemoteService::new(&url, config.request_timeout())?;
    let prober = Prober::new(Arc::new(remote), config.request_timeout());
    if prober.probe().await {
        println!("online: {}", url);
        Ok(())
    } else {
        Err(anyhow!("generation service at {} is not reachable", url))
    }
}

fn show_config(cli: &Cli, config: &Config, write: bool) -> Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let resolved = Config {
        api_base_url: Some(config.api_base_url()),
        request_timeout_secs: Some(config.request_timeout().as_secs()),
        remote_enabled: Some(config.remote_enabled()),
        reply_delay_ms: Some(config.reply_delay().as_millis() as u64),
        download_dir: Some(config.download_dir()),
    };

    if write {
        resolved.save_to(&path)?;
        tracing::info!(path = %path.display(), "wrote config");
    }
    println!("{}", path.display());
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}
