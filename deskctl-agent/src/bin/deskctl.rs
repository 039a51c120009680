use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::{ArgAction, Parser, Subcommand};
use dialoguer::Input;
use tracing_subscriber::EnvFilter;

use deskctl::{
    ComputerTool, CoordinateMapper, Display, DisplayRegistry, ScreenshotPipeline, ShellRunner,
    ToolRegistry,
};
use deskctl_agent::{AnthropicClient, Config, ConsoleObserver, Error, Result, Session};

#[derive(Parser)]
#[command(name = "deskctl", about = "Drive a macOS desktop from an Anthropic model", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Silence all logging
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive session: you type goals, the model drives the screen
    Chat {
        /// Display index to control (overrides the config)
        #[arg(long)]
        display: Option<u32>,
        /// Model name (overrides the config)
        #[arg(long)]
        model: Option<String>,
    },
    /// Run a single prompt to completion and exit
    Run {
        prompt: String,
        #[arg(long)]
        display: Option<u32>,
        #[arg(long)]
        model: Option<String>,
    },
    /// List connected displays
    Displays,
    /// Capture one screenshot to a file
    Screenshot {
        /// Output path for the PNG
        #[arg(short, long, default_value = "screenshot.png")]
        output: PathBuf,
        #[arg(long)]
        display: Option<u32>,
    },
    /// Show the effective configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("deskctl={level},deskctl_agent={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Chat { display, model } => run_chat(display, model),
        Command::Run {
            prompt,
            display,
            model,
        } => run_once(&prompt, display, model),
        Command::Displays => run_displays(),
        Command::Screenshot { output, display } => run_screenshot(&output, display),
        Command::Config { init } => run_config(init),
    }
}

fn run_chat(display: Option<u32>, model: Option<String>) -> Result<()> {
    let config = Config::load();
    let mut session = build_session(&config, display, model)?;
    println!("deskctl chat; type 'exit' to quit.");
    loop {
        let line: String = Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            return Ok(());
        }
        // A failed turn should not kill the session.
        if let Err(err) = session.run_turn(line) {
            eprintln!("Error: {err}");
        }
    }
}

fn run_once(prompt: &str, display: Option<u32>, model: Option<String>) -> Result<()> {
    let config = Config::load();
    let mut session = build_session(&config, display, model)?;
    session.run_turn(prompt)
}

fn run_displays() -> Result<()> {
    let registry = DisplayRegistry::platform();
    let displays = registry.list()?;
    if displays.is_empty() {
        println!("No displays found.");
        return Ok(());
    }
    for display in displays {
        let (width, height) = CoordinateMapper::new(display).scaled_size();
        println!("{} -> agent space {}x{}", display.description(), width, height);
    }
    Ok(())
}

fn run_screenshot(output: &std::path::Path, display_override: Option<u32>) -> Result<()> {
    let config = Config::load();
    let registry = DisplayRegistry::platform();
    let index = display_override.unwrap_or(config.session.selected_display);
    let display = resolve_with_fallback(&registry, index)?;

    let pipeline = ScreenshotPipeline::new(display, Arc::new(ShellRunner));
    let result = pipeline.capture()?;
    let image = match result.image {
        Some(image) => image,
        None => return Err(deskctl::Error::CaptureFailed("empty capture result".into()).into()),
    };
    std::fs::write(output, STANDARD.decode(image.as_bytes())?)?;

    println!(
        "Saved {}x{} screenshot to {}",
        display.width,
        display.height,
        output.display()
    );
    Ok(())
}

fn run_config(init: bool) -> Result<()> {
    let path = Config::path();
    if init {
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            Config::default().save()?;
            println!("Wrote default config to {}", path.display());
        }
        return Ok(());
    }
    let config = Config::load();
    let rendered =
        toml::to_string_pretty(&config).map_err(|err| Error::ConfigError(err.to_string()))?;
    println!("# {}", path.display());
    print!("{rendered}");
    Ok(())
}

fn build_session(
    config: &Config,
    display_override: Option<u32>,
    model_override: Option<String>,
) -> Result<Session> {
    if config.llm.provider != "anthropic" {
        return Err(Error::ConfigError(format!(
            "unsupported provider: {}",
            config.llm.provider
        )));
    }
    let api_key = config.api_key().ok_or_else(|| {
        Error::ConfigError("no API key; set ANTHROPIC_API_KEY or llm.api_key".into())
    })?;
    let model = model_override.unwrap_or_else(|| config.llm.model.clone());

    let registry = DisplayRegistry::platform();
    let index = display_override.unwrap_or(config.session.selected_display);
    let display = resolve_with_fallback(&registry, index)?;
    // `display.id` cannot appear inline: tracing's macros expand value
    // expressions in a scope where `display` names the sigil helper.
    let display_id = display.id;
    tracing::info!(display = display_id, model = %model, "session bound");

    let tool = ComputerTool::new(display, Arc::new(ShellRunner));
    let mut tools = ToolRegistry::new();
    tools.register(Box::new(tool))?;

    let client = AnthropicClient::new(api_key, model, config.llm.max_tokens);
    Ok(Session::new(client, tools)
        .with_observer(Arc::new(ConsoleObserver::new(config.session.hide_images)))
        .with_keep_images(config.session.only_n_most_recent_images)
        .with_system_prompt_suffix(&config.session.system_prompt_suffix))
}

/// A configured index pointing at a disconnected display falls back to
/// the main display instead of refusing to start.
fn resolve_with_fallback(registry: &DisplayRegistry, index: u32) -> Result<Display> {
    match registry.resolve(index) {
        Ok(display) => Ok(display),
        Err(err @ deskctl::Error::DisplayNotFound { .. }) if index != 0 => {
            tracing::warn!(%err, "falling back to the first display");
            Ok(registry.resolve(0)?)
        }
        Err(err) => Err(err.into()),
    }
}
