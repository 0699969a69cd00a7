use anyhow::{Context, Result, bail};
use clap::{Parser as CliParser, Subcommand};
use marker::GradingJob;
use marker::generators::gemini::GeminiGenerator;
use marker::parsers::grading_parser::{GradingReplyParser, TotalPolicy};
use marker::prompt::compile;
use marker::refine_ocr_text;
use marker::report::{ScoreRecord, ScoreReportResponse};
use marker::request::GradingRequest;
use marker::rubric::store::RubricStore;
use marker::traits::parser::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::rolling;
use util::config::{self, AppConfig};

#[derive(CliParser, Debug)]
#[command(version, about = "Grade exam essays against a fixed rubric with a language model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the essay prompt titles that have a rubric
    List,
    /// Print the grading prompt for an essay
    Prompt {
        #[arg(long)]
        title: String,
        /// Essay file, or "-" for stdin
        #[arg(long)]
        essay: PathBuf,
    },
    /// Validate a saved model reply and print the score record
    Parse {
        #[arg(long)]
        title: String,
        /// Reply file, or "-" for stdin
        #[arg(long)]
        reply: PathBuf,
        /// Reject a stated total that differs from the sum of part scores
        #[arg(long)]
        strict: bool,
    },
    /// Grade an essay with Gemini and print the score record
    Grade {
        #[arg(long)]
        title: String,
        /// Essay file, or "-" for stdin
        #[arg(long)]
        essay: PathBuf,
        /// Reject a stated total that differs from the sum of part scores
        #[arg(long)]
        strict: bool,
    },
    /// Clean up OCR output with Gemini before grading
    Refine {
        /// OCR text file, or "-" for stdin
        #[arg(long)]
        text: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&config::log_file(), &config::log_level());

    info!(project = %config::project_name(), env = %config::app_env(), "Starting grader");
    let store = RubricStore::load().context("failed to load rubrics")?;

    let output = run(cli.command, &store).await?;
    println!("{output}");
    Ok(())
}

/// Executes one subcommand and returns what should be printed.
async fn run(command: Command, store: &RubricStore) -> Result<String> {
    match command {
        Command::List => Ok(store.titles().collect::<Vec<_>>().join("\n")),
        Command::Prompt { title, essay } => {
            let essay = read_input(&essay)?;
            let rubric = store.lookup(&title)?;
            Ok(compile(&title, rubric, &essay))
        }
        Command::Parse {
            title,
            reply,
            strict,
        } => {
            let reply = read_input(&reply)?;
            let rubric = store.lookup(&title)?;
            let graded = GradingReplyParser::new(rubric)
                .with_total_policy(total_policy(strict))
                .parse(&reply)
                .with_context(|| format!("reply does not fit the rubric for '{title}'"))?;
            render(ScoreRecord::new(rubric, graded))
        }
        Command::Grade {
            title,
            essay,
            strict,
        } => {
            if strict {
                AppConfig::set_grading_strict_total(true);
            }
            let essay = read_input(&essay)?;
            let generator = GeminiGenerator::from_config()?;
            let record = GradingJob::from_request(store, GradingRequest::new(title, essay), generator)?
                .configured()
                .grade()
                .await?;
            render(record)
        }
        Command::Refine { text } => {
            let text = read_input(&text)?;
            let generator = GeminiGenerator::from_config()?;
            Ok(refine_ocr_text(&generator, &text).await?)
        }
    }
}

fn total_policy(strict: bool) -> TotalPolicy {
    if strict || config::grading_strict_total() {
        TotalPolicy::Reject
    } else {
        TotalPolicy::Warn
    }
}

fn render(record: ScoreRecord) -> Result<String> {
    serde_json::to_string_pretty(&ScoreReportResponse::from(record))
        .context("failed to serialize score record")
}

/// Reads a whole file, or stdin when `path` is `-`.
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    if !path.is_file() {
        bail!("input file not found: {}", path.display());
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn init_logging(log_file: &str, log_level: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    // stdout carries command output, so console logs go to stderr
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true);

    let env_filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if config::log_to_stdout() {
        registry.with(stderr_layer).init();
    } else {
        registry.init();
    }

    guard
}
