//! examsim CLI: terminal front end for the exam simulator.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "examsim", version, about = "Timed multiple-choice exam simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a timed exam interactively
    Run {
        /// Question file (.json, or .toml with [[questions]])
        #[arg(long)]
        questions: PathBuf,

        /// Exam length in seconds (default: 14400)
        #[arg(long)]
        duration: Option<u64>,

        /// RNG seed for a reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Keep the question order from the file
        #[arg(long)]
        no_shuffle: bool,

        /// Exam title
        #[arg(long)]
        title: Option<String>,

        /// Write a report of the final submitted attempt to this directory
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// Report format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a question file
    Validate {
        /// Question file to check
        #[arg(long)]
        questions: PathBuf,
    },

    /// Create a starter config and sample question file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examsim=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            questions,
            duration,
            seed,
            no_shuffle,
            title,
            report_dir,
            format,
            config,
        } => {
            commands::run::execute(commands::run::RunArgs {
                questions,
                duration,
                seed,
                no_shuffle,
                title,
                report_dir,
                format,
                config,
            })
            .await
        }
        Commands::Validate { questions } => commands::validate::execute(questions).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
