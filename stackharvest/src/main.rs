//! stackharvest - collect tagged Q&A threads from a Stack Exchange site
//!
//! Fetches questions matching a tag (paginated, newest first), merges each
//! question's answers into it, checkpoints progress every ten questions,
//! and writes the final JSON data set.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Output: $XDG_DATA_HOME/stackharvest/raw/ (~/.local/share/stackharvest/raw/)
//! - Logs: $XDG_STATE_HOME/stackharvest/stackharvest.log
//! - Config: $XDG_CONFIG_HOME/stackharvest/config.toml

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use stackharvest_core::collector::SyncCollector;
use stackharvest_core::{storage, Config, QuestionQuery};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stackharvest")]
#[command(about = "Collect tagged Q&A threads from a Stack Exchange site")]
#[command(version)]
struct Args {
    /// Tag to collect questions for
    #[arg(short, long)]
    tag: Option<String>,

    /// Maximum number of questions to collect
    #[arg(short, long)]
    max_count: Option<usize>,

    /// Minimum number of answers per question
    #[arg(long)]
    min_answers: Option<u32>,

    /// Minimum question score
    #[arg(long)]
    min_score: Option<i64>,

    /// Inclusive lower creation-date bound (YYYY-MM-DD)
    #[arg(long)]
    from_date: Option<String>,

    /// Inclusive upper creation-date bound (YYYY-MM-DD)
    #[arg(long)]
    to_date: Option<String>,

    /// Generate mock data instead of calling the live API
    #[arg(long)]
    mock: bool,

    /// Seed for the mock generator (deterministic output)
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for checkpoints and the final output file
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Config file path (default: XDG config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output (enables file logging)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load_from(path).context("failed to load configuration")?,
        None => Config::load().context("failed to load configuration")?,
    };

    apply_overrides(&mut config, &args);

    // Initialize logging if verbose
    let _log_guard = if args.verbose {
        Some(
            stackharvest_core::logging::init(&config.logging)
                .context("failed to initialize logging")?,
        )
    } else {
        None
    };

    config.query.validate().context("invalid query")?;
    let query = build_query(&config, &args)?;

    tracing::info!(
        site = %config.collector.site,
        tag = %query.tag,
        max_count = query.max_count,
        mock = config.collector.use_mock_data,
        "stackharvest starting"
    );

    let collector = SyncCollector::new(&config.collector).context("failed to create collector")?;

    if config.collector.use_mock_data {
        println!("Collecting [{}] questions (mock data)...", query.tag);
    } else {
        println!(
            "Collecting [{}] questions from {}...",
            query.tag, config.collector.site
        );
    }

    let pb = ProgressBar::new(query.max_count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let questions = collector
        .collect_with_progress(&query, |current, total, question_id| {
            if current == 0 {
                pb.set_length(total as u64);
            }
            pb.set_position(current as u64);
            pb.set_message(format!("question {}", question_id));
        })
        .context("collection failed")?;

    pb.finish_and_clear();

    if questions.is_empty() {
        println!("No questions collected.");
        tracing::warn!("Collection produced no results");
        return Ok(());
    }

    let output = storage::output_path(collector.output_dir(), &query.tag);
    storage::save_json(&questions, &output).context("failed to save output")?;

    let total_answers: usize = questions.iter().map(|q| q.answers.len()).sum();

    println!("\nCollection complete:");
    println!("  Questions: {}", questions.len());
    println!("  Answers:   {}", total_answers);
    println!("  Output:    {}", output.display());

    tracing::info!(
        questions = questions.len(),
        answers = total_answers,
        output = %output.display(),
        "stackharvest complete"
    );

    Ok(())
}

/// Fold CLI flags into the loaded configuration.
fn apply_overrides(config: &mut Config, args: &Args) {
    if args.mock {
        config.collector.use_mock_data = true;
    }
    if let Some(seed) = args.seed {
        config.collector.mock_seed = Some(seed);
    }
    if let Some(dir) = &args.output_dir {
        config.collector.output_dir = Some(dir.clone());
    }
    if let Some(tag) = &args.tag {
        config.query.tag = tag.clone();
    }
    if let Some(max_count) = args.max_count {
        config.query.max_count = max_count;
    }
    if let Some(min_answers) = args.min_answers {
        config.query.min_answers = min_answers;
    }
    if let Some(min_score) = args.min_score {
        config.query.min_score = min_score;
    }
}

/// Build the question query from config defaults plus date flags.
fn build_query(config: &Config, args: &Args) -> Result<QuestionQuery> {
    let mut query = QuestionQuery::new(config.query.tag.clone(), config.query.max_count);
    query.min_answers = config.query.min_answers;
    query.min_score = config.query.min_score;

    if let Some(raw) = &args.from_date {
        query.from_date = Some(parse_date(raw, false)?);
    }
    if let Some(raw) = &args.to_date {
        query.to_date = Some(parse_date(raw, true)?);
    }

    Ok(query)
}

/// Parse a YYYY-MM-DD date; upper bounds extend to the end of the day so
/// the range stays inclusive.
fn parse_date(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| anyhow!("invalid date '{}': {}", raw, e))?;

    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    }
    .expect("fixed time components are valid");

    Ok(DateTime::from_naive_utc_and_offset(time, Utc))
}
