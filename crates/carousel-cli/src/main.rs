use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use carousel_core::{AppConfig, LayoutMode, WheelAlignment};

mod commands;

#[derive(Parser)]
#[command(name = "carousel")]
#[command(author, version, about = "A circular, virtualized item carousel for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive carousel
    Run(LayoutArgs),
    /// Print the computed per-slot layout
    Geometry {
        #[command(flatten)]
        layout: LayoutArgs,
        /// Container width in columns
        #[arg(long, default_value_t = 120)]
        width: u16,
        /// Container height in rows
        #[arg(long, default_value_t = 40)]
        height: u16,
        /// Item to select before printing
        #[arg(long)]
        select: Option<usize>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration if none exists
    Init,
    /// Print the configuration file path
    Path,
}

/// Overrides applied on top of the configuration file
#[derive(clap::Args)]
struct LayoutArgs {
    #[arg(short, long, value_enum)]
    layout: Option<LayoutArg>,
    #[arg(short, long, value_enum)]
    alignment: Option<AlignmentArg>,
    /// Requested window size (normalized to a multiple-of-12 rule between 12 and 72)
    #[arg(short, long, allow_negative_numbers = true)]
    density: Option<i64>,
    /// File with one item per line
    #[arg(short, long)]
    items: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Row,
    Column,
    Wheel,
}

#[derive(Clone, Copy, ValueEnum)]
enum AlignmentArg {
    Left,
    Right,
    Top,
    Bottom,
}

impl LayoutArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(layout) = self.layout {
            config.carousel.layout_mode = match layout {
                LayoutArg::Row => LayoutMode::Row,
                LayoutArg::Column => LayoutMode::Column,
                LayoutArg::Wheel => LayoutMode::Wheel,
            };
        }
        if let Some(alignment) = self.alignment {
            config.carousel.wheel_alignment = match alignment {
                AlignmentArg::Left => WheelAlignment::Left,
                AlignmentArg::Right => WheelAlignment::Right,
                AlignmentArg::Top => WheelAlignment::Top,
                AlignmentArg::Bottom => WheelAlignment::Bottom,
            };
        }
        if let Some(density) = self.density {
            config.carousel.density = density;
        }
        if let Some(items) = &self.items {
            config.general.items_file = Some(items.clone());
        }
    }
}

/// Initialize logging. The interactive view owns the terminal, so it logs to a file.
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let writer = if to_file {
        let path = log_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        BoxMakeWriter::new(Mutex::new(file))
    } else {
        BoxMakeWriter::new(std::io::stderr)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(!to_file)
                .with_writer(writer),
        )
        .init();
    Ok(())
}

fn log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("carousel")
        .join("carousel.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load()?;

    let interactive = matches!(cli.command, Some(Commands::Run(_)) | None);
    init_logging(&config, interactive)?;

    match cli.command {
        Some(Commands::Run(args)) => {
            args.apply(&mut config);
            commands::run::run(config).await
        }
        None => commands::run::run(config).await,
        Some(Commands::Geometry {
            layout,
            width,
            height,
            select,
            json,
        }) => {
            layout.apply(&mut config);
            let options = commands::geometry::Options {
                width,
                height,
                select,
                json,
            };
            commands::geometry::run(config, options).await
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init => commands::config::init(),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
