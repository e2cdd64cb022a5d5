//! Botcheck CLI - run the validation suite against a chatbot endpoint

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use botcheck_core::config::BotcheckConfig;
use botcheck_core::eval::report::EXIT_USAGE;
use botcheck_core::eval::{RunOptions, ValidationPipeline};
use botcheck_core::questions::QuestionSet;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "botcheck")]
#[command(about = "Validation harness for chatbot endpoints", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the validation suite
    Run {
        /// Configuration file merged over defaults and botcheck.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Question file, overriding suite.questions_path
        #[arg(short, long, env = "BOTCHECK_QUESTIONS")]
        questions: Option<PathBuf>,

        /// Run only the named check (repeatable)
        #[arg(long = "only", value_name = "NAME")]
        only: Vec<String>,

        /// Also run the prerequisites of checks selected with --only
        #[arg(long)]
        with_prerequisites: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load a question file and print its pairs
    Questions {
        /// Path to the JSON question file
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Version information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            questions,
            only,
            with_prerequisites,
            json,
        } => {
            let options = RunOptions {
                only,
                with_prerequisites,
            };
            run(config, questions, &options, json).await
        }
        Commands::Questions { file, json } => show_questions(&file, json).map(|_| 0),
        Commands::Version => {
            println!("botcheck {}", env!("CARGO_PKG_VERSION"));
            println!("botcheck-core {}", botcheck_core::VERSION);
            Ok(0)
        }
    };

    match result {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            exit_code(EXIT_USAGE)
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

/// Errors returned from here are setup problems; check failures come back as an exit code.
async fn run(
    config_path: Option<PathBuf>,
    questions: Option<PathBuf>,
    options: &RunOptions,
    json: bool,
) -> Result<i32> {
    let mut config =
        BotcheckConfig::load_with(config_path.as_deref()).context("failed to load configuration")?;
    if let Some(path) = questions {
        config.suite.questions_path = path;
    }
    tracing::debug!(?options, questions = %config.suite.questions_path.display(), "configuration loaded");

    let pipeline = ValidationPipeline::from_config(&config)?;
    let report = pipeline.run_with(options).await?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render());
    }

    Ok(report.exit_code())
}

fn show_questions(path: &Path, json: bool) -> Result<()> {
    let set = QuestionSet::load(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&set)?);
        return Ok(());
    }

    for (index, pair) in set.iter().enumerate() {
        println!("{:>3}. {} -> {}", index + 1, pair.question, pair.expected_answer);
    }
    println!("{} question(s) in {}", set.len(), path.display());
    Ok(())
}
