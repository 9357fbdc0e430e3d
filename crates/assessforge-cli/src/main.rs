//! assessforge CLI: validate, inspect, and score assessment attempts.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "assessforge",
    version,
    about = "Assessment delivery and scoring engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate assessment definition files
    Validate {
        /// Path to a .toml definition or a directory of them
        #[arg(long)]
        definition: PathBuf,
    },

    /// Show the resolved structure of a definition
    Inspect {
        /// Path to a .toml definition
        #[arg(long)]
        definition: PathBuf,
    },

    /// Replay recorded responses through an attempt and score it
    Score {
        /// Path to a .toml definition
        #[arg(long)]
        definition: PathBuf,

        /// Path to a .toml responses file
        #[arg(long)]
        responses: PathBuf,

        /// Output format: json, html, markdown, all (default from config)
        #[arg(long)]
        format: Option<String>,

        /// Output directory (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Render a saved JSON attempt report
    Render {
        /// Report JSON produced by `score`
        #[arg(long)]
        report: PathBuf,

        /// Output format: text, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Create starter config, definition, and responses
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("assessforge=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { definition } => commands::validate::execute(definition),
        Commands::Inspect { definition } => commands::inspect::execute(definition),
        Commands::Score {
            definition,
            responses,
            format,
            output,
            config,
        } => commands::score::execute(definition, responses, format, output, config),
        Commands::Render {
            report,
            format,
            output,
        } => commands::render::execute(report, format, output),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
