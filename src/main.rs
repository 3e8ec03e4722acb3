use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

mod benchmark;
mod config;
mod db;
mod insights;
mod journal;
mod models;
mod report;
mod scoring;
mod telemetry;
mod trend;

use benchmark::{BenchmarkAxes, ReferenceTable};
use config::AppConfig;
use scoring::{LikertScale, ResponseRecorder};

#[derive(Parser)]
#[command(name = "eq-insights")]
#[command(about = "Scoring, benchmarks and trend analysis for EQ self-assessments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one set of answers and compare it to the benchmarks
    Score {
        /// Comma-separated answers in question order, e.g. 4,5,3
        #[arg(long, value_delimiter = ',', required = true)]
        answers: Vec<u8>,
        #[arg(long, default_value_t = 5)]
        scale: u8,
        #[arg(long)]
        age: Option<i64>,
        #[arg(long)]
        profession: Option<String>,
    },
    /// Summarize a user's score history
    Trend {
        #[arg(long)]
        username: String,
    },
    /// Compare recent attempts with older ones
    Compare {
        #[arg(long)]
        username: String,
        #[arg(long)]
        since_days: Option<i64>,
    },
    /// Generate personalized insights
    Insights {
        #[arg(long)]
        username: String,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        username: String,
        #[arg(long)]
        profession: Option<String>,
        #[arg(long)]
        since_days: Option<i64>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Import score history from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
}

fn load_references(path: &Path) -> Option<ReferenceTable> {
    match ReferenceTable::load(path) {
        Ok(table) => {
            tracing::debug!(
                path = %path.display(),
                age_groups = table.age_groups.len(),
                professions = table.professions.len(),
                "loaded reference table"
            );
            Some(table)
        }
        Err(err) => {
            tracing::warn!(error = %err, "benchmarks unavailable");
            None
        }
    }
}

fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("invalid configuration")?;
    telemetry::init(&config.telemetry).context("failed to initialise logging")?;

    match cli.command {
        Commands::Score {
            answers,
            scale,
            age,
            profession,
        } => {
            let scale = LikertScale::from_max(scale)
                .with_context(|| format!("unsupported scale 1-{scale}, use 4 or 5"))?;
            let mut recorder = ResponseRecorder::new(scale);
            let answered_at = now();
            for (index, value) in answers.iter().enumerate() {
                recorder.record(index as i64 + 1, *value, Some(answered_at))?;
            }

            let summary = recorder.summary();
            let interpretation = scoring::interpret(&summary, recorder.responses().len());
            println!(
                "Score {}/{} ({:.1}%)",
                summary.total_score, summary.max_score, summary.percentage
            );
            println!("{}", interpretation.message());

            if let Some(references) = load_references(&config.benchmarks_path) {
                let group = scoring::age_group(age);
                let axes = BenchmarkAxes {
                    age_group: (group != "unknown").then_some(group),
                    profession: profession.as_deref(),
                };
                let comparisons =
                    benchmark::compare(summary.total_score as f64, &references, axes);
                let mut output = String::new();
                report::write_benchmarks(&mut output, &comparisons);
                print!("{output}");
            }
        }
        Commands::Trend { username } => {
            let pool = db::connect(&config.database_url).await?;
            let history = db::fetch_scores(&pool, &username).await?;
            let responses = db::fetch_responses(&pool, &username).await?;

            let Some(summary) = trend::summarize(&history) else {
                println!("No assessments recorded for {username}.");
                return Ok(());
            };

            let mut output = String::new();
            report::write_trend(&mut output, &summary);
            print!("{output}");

            if let Some(patterns) = trend::response_patterns(&responses) {
                println!(
                    "Responses: {} across {} questions, average {:.2} (std dev {:.2})",
                    patterns.total_responses,
                    patterns.unique_questions,
                    patterns.average_response,
                    patterns.response_std_dev
                );
            }
        }
        Commands::Compare {
            username,
            since_days,
        } => {
            let pool = db::connect(&config.database_url).await?;
            let history = db::fetch_scores(&pool, &username).await?;
            let lookback_days = since_days.unwrap_or(config.lookback_days);
            let analysis = trend::compare_periods(&history, now(), lookback_days);

            let mut output = String::new();
            report::write_comparative(&mut output, &analysis);
            print!("{output}");
        }
        Commands::Insights { username } => {
            let pool = db::connect(&config.database_url).await?;
            let history = db::fetch_scores(&pool, &username).await?;
            let entries = db::fetch_journal(&pool, &username).await?;
            let references = load_references(&config.benchmarks_path);

            let scores: Vec<i64> = history.iter().map(|record| record.total_score).collect();
            let generated = insights::generate(
                &scores,
                &journal::sentiments(&entries),
                references.as_ref().map(|table| &table.global),
            );

            for insight in &generated {
                println!("[{}] {}", insight.tone.label(), insight.message);
            }
        }
        Commands::Report {
            username,
            profession,
            since_days,
            out,
        } => {
            let pool = db::connect(&config.database_url).await?;
            let history = db::fetch_scores(&pool, &username).await?;
            let responses = db::fetch_responses(&pool, &username).await?;
            let entries = db::fetch_journal(&pool, &username).await?;
            let references = load_references(&config.benchmarks_path);

            let content = report::build_report(&report::ReportContext {
                username: &username,
                profession: profession.as_deref(),
                lookback_days: since_days.unwrap_or(config.lookback_days),
                now: now(),
                history: &history,
                responses: &responses,
                journal: &entries,
                references: references.as_ref(),
            });
            std::fs::write(&out, content)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Import { csv } => {
            let pool = db::connect(&config.database_url).await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} scores from {}.", csv.display());
        }
    }

    Ok(())
}
