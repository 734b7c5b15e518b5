//! dikduk CLI: grade Hebrew verb-analysis answers from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "dikduk", version, about = "Hebrew verb-analysis grading")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a student's answer sheet against an assignment
    Grade {
        /// Path to the assignment .toml file
        #[arg(long)]
        assignment: PathBuf,

        /// Path to the student's answer sheet (.json)
        #[arg(long)]
        answers: PathBuf,

        /// Output directory for the report (default: from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// What to print: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a single answer against the grammar table
    Check {
        /// Field: shoresh, binyan, zman, guf
        #[arg(long)]
        field: String,

        /// The student's answer
        #[arg(long)]
        answer: String,

        /// The correct answer to compare against
        #[arg(long)]
        expected: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Approve one field of a graded report and recompute the total
    Approve {
        /// Report JSON written by `dikduk grade`
        #[arg(long)]
        report: PathBuf,

        /// Sentence number
        #[arg(long)]
        sentence: u32,

        /// Field to mark correct
        #[arg(long)]
        field: String,
    },

    /// Validate assignment TOML files
    Validate {
        /// Path to an assignment file or directory
        #[arg(long)]
        assignment: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the grammar table
    Grammar {
        /// Only this field: binyan, zman, guf
        #[arg(long)]
        field: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config, grammar table and example assignment
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dikduk=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            assignment,
            answers,
            output,
            format,
            config,
        } => commands::grade::execute(assignment, answers, output, format, config).await,
        Commands::Check {
            field,
            answer,
            expected,
            config,
        } => commands::check::execute(field, answer, expected, config),
        Commands::Approve {
            report,
            sentence,
            field,
        } => commands::approve::execute(report, sentence, field),
        Commands::Validate { assignment, config } => {
            commands::validate::execute(assignment, config)
        }
        Commands::Grammar { field, config } => commands::grammar::execute(field, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
