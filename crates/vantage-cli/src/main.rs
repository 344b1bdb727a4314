use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use vantage_controls::ControlsConfig;
use vantage_io::{load_config, load_script, replay, save_config, save_report};

#[derive(Parser)]
#[command(name = "vantage")]
#[command(about = "Headless driver for the Vantage viewport controls")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run a scripted input session and report the final state")]
    Replay(ReplayArgs),
    #[command(about = "Write the default controls configuration")]
    Config(ConfigArgs),
}

#[derive(Args)]
struct ReplayArgs {
    #[arg(long)]
    script: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, help = "Write the report here instead of printing it")]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct ConfigArgs {
    #[arg(long)]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Replay(args) => run_replay(args),
        Command::Config(args) => write_config(args),
    }
}

fn run_replay(args: ReplayArgs) -> Result<()> {
    let script = load_script(&args.script)?;
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ControlsConfig::default(),
    };

    let report = replay(&script, &config)
        .with_context(|| format!("replay {}", args.script.display()))?;

    match args.out {
        Some(path) => {
            save_report(&report, &path).context("report export failed")?;
            info!(path = %path.display(), "report written");
        }
        None => {
            let text = serde_json::to_string_pretty(&report).context("serialize report")?;
            println!("{text}");
        }
    }
    Ok(())
}

fn write_config(args: ConfigArgs) -> Result<()> {
    save_config(&ControlsConfig::default(), &args.out).context("config export failed")?;
    info!(path = %args.out.display(), "default config written");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
