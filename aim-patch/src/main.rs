use std::path::{Path, PathBuf};

use aim_invert::site::HookLayout;
use aim_patch::config::PatchConfig;
use aim_patch::render;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aim-patch")]
#[command(about = "Render the aim-invert controller hook patch")]
#[command(version)]
struct Cli {
    /// Patch config (TOML). The stock layout is used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// More log output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// ROM/RAM address listing of the call-site trampoline
    Listing,
    /// GameShark codes that splice the trampoline in at runtime
    Gameshark,
    /// Byte layout of the controller record
    Layout,
    /// Compress a GameShark code list with repeaters
    Optimize {
        /// Code list, one `XXXXXXXX YYYY` per line
        input: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_layout(config: Option<&Path>) -> Result<HookLayout> {
    let config = match config {
        Some(path) => {
            log::info!("loading patch config from {}", path.display());
            PatchConfig::load(path)?
        },
        None => {
            log::info!("no config given, using the stock layout");
            PatchConfig::default()
        },
    };
    config.layout()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let text = match &cli.command {
        Command::Listing => render::listing(&load_layout(cli.config.as_deref())?)?,
        Command::Gameshark => render::gameshark(&load_layout(cli.config.as_deref())?)?,
        Command::Layout => render::layout_table()?,
        Command::Optimize { input } => {
            let codes = std::fs::read_to_string(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            render::optimize(&codes).with_context(|| format!("in {}", input.display()))?
        },
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("wrote {}", path.display());
        },
        None => print!("{text}"),
    }
    Ok(())
}
