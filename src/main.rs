use clap::{Parser, Subcommand};
use squaregray::config::{self, ConfigOverrides};
use squaregray::process::ProcessEvent;
use squaregray::{output, process};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::thread::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Values that override `config.toml` for this run.
#[derive(clap::Args, Clone, Default)]
struct OverrideArgs {
    /// Max % the long side may exceed the short side (default 40)
    #[arg(long)]
    max_diff_ratio: Option<u32>,

    /// Side length of the square output in pixels, 1-4096 (default 32)
    #[arg(long)]
    size: Option<u32>,

    /// JPEG quality 1-100 (default 75)
    #[arg(long)]
    quality: Option<u32>,
}

impl From<&OverrideArgs> for ConfigOverrides {
    fn from(args: &OverrideArgs) -> Self {
        Self {
            max_pixel_diff_ratio: args.max_diff_ratio,
            desired_dimension: args.size,
            quality: args.quality,
        }
    }
}

#[derive(clap::Args, Clone, Default)]
struct RunArgs {
    #[command(flatten)]
    overrides: OverrideArgs,

    /// Write the run result as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "squaregray")]
#[command(about = "Normalize nearly-square JPEGs into small square grayscale images")]
#[command(long_about = "\
Normalize nearly-square JPEGs into small square grayscale images

Every JPEG in the source directory and its direct subdirectories is checked
for aspect ratio, center-cropped to a square, resized, converted to grayscale,
and written under the same relative path in the output directory.

Images whose long side exceeds the short side by more than the tolerance are
skipped. Unreadable images are reported and skipped; the run continues.

Layout:

  images/                 output/
  ├── config.toml         ├── 0001.jpg
  ├── 0001.jpg      →     └── faces/
  └── faces/                  └── a.jpg
      └── a.jpg

Run 'squaregray gen-config' to print a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Source directory
    #[arg(long, default_value = "images", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "output", global = true)]
    output: PathBuf,

    /// Show per-image lines; repeat for debug logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize every image (the default)
    Run(RunArgs),
    /// Report which images would be accepted, without writing anything
    Check(OverrideArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Spawn the thread that prints progress events as they arrive.
fn spawn_printer(rx: Receiver<ProcessEvent>, verbose: bool) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for event in rx {
            output::print_process_event(&event, verbose);
        }
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let verbose = cli.verbose > 0;

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => {
            let config =
                config::load_config_with_overrides(&cli.source, &(&args.overrides).into())?;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = spawn_printer(rx, verbose);
            let result = process::process(&cli.source, &cli.output, &config, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let result = result?;
            output::print_summary(&result);

            if let Some(report) = args.report {
                let json = serde_json::to_string_pretty(&result)?;
                std::fs::write(&report, json)?;
            }
        }
        Command::Check(overrides) => {
            let config = config::load_config_with_overrides(&cli.source, &(&overrides).into())?;
            println!("==> Checking {}", cli.source.display());
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = spawn_printer(rx, verbose);
            let result = process::check(&cli.source, &config, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            output::print_check_summary(&result?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
