mod commands;
mod config;
mod rapier;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use designer::editor::EditorError;
use designer::persist::{LoadError, SaveError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid scene: {0}")]
    Load(#[from] LoadError),
    #[error("cannot write scene: {0}")]
    Save(#[from] SaveError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("preview did not start: {0}")]
    Preview(String),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "physmap", about = "Inspect, export and simulate 2D physics scenes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a saved scene and summarize its contents.
    Check {
        scene: PathBuf,
    },
    /// Write the engine-ready export document.
    Export {
        scene: PathBuf,
        #[arg(long, short, help = "Output file path; stdout when absent")]
        output: Option<PathBuf>,
    },
    /// Run the physics preview headless and print the final poses.
    Preview(PreviewArgs),
}

#[derive(Args, Debug, Clone)]
struct PreviewArgs {
    scene: PathBuf,

    #[arg(long, env = "PHYSMAP_STEPS", default_value_t = 60)]
    steps: usize,

    #[arg(long, help = "Zoom in pixels per meter; configured default when absent")]
    ppm: Option<f64>,

    #[arg(long, default_value_t = 800.0)]
    width: f64,

    #[arg(long, default_value_t = 600.0)]
    height: f64,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check { scene } => {
            let report = commands::check(&scene)?;
            print!("{report}");
        }
        Command::Export { scene, output } => {
            let json = commands::export(&scene, output.as_deref())?;
            if let Some(json) = json {
                println!("{json}");
            }
        }
        Command::Preview(args) => {
            let config = config::from_env()?;
            let poses = commands::preview(&args, config)?;
            println!("{}", serde_json::to_string_pretty(&poses)?);
        }
    }
    Ok(())
}
