//! @ai:module:intent CLI for prompt version metrics tracking
//! @ai:module:layer presentation

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use promptver::{
    config::AppConfig,
    metrics::{MetricRecord, MetricsAggregator, MetricsAggregatorTrait, ModelRanker, ModelRankerTrait, Summary},
    analysis::{AlertSeverity, RegressionMonitor, SignificanceTester, SignificanceTesterTrait, Verdict},
    store::{JsonlStore, MetricStore, RecordFilter},
    version::{next_version, VersionBump},
};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "promptver")]
#[command(about = "Prompt version metrics: log LLM calls, compare versions, catch regressions")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "promptver.toml")]
        output: PathBuf,
    },

    /// Log one LLM call for a prompt version
    Log {
        /// Prompt name
        #[arg(short, long)]
        prompt: String,

        /// Prompt version
        #[arg(short = 'V', long)]
        version: String,

        /// Model name
        #[arg(short, long)]
        model: String,

        /// Input token count
        #[arg(long, default_value = "0")]
        input_tokens: u32,

        /// Output token count
        #[arg(long, default_value = "0")]
        output_tokens: u32,

        /// Call latency in milliseconds
        #[arg(long)]
        latency_ms: f64,

        /// Quality score in [0, 1]
        #[arg(long)]
        quality: Option<f64>,

        /// Call cost (derived from the pricing table when omitted)
        #[arg(long)]
        cost: Option<f64>,

        /// Mark the call as failed
        #[arg(long)]
        failed: bool,

        /// Extra metric as name=value (repeatable)
        #[arg(long = "extra", value_name = "NAME=VALUE")]
        extras: Vec<String>,
    },

    /// Summarize metrics for a prompt version
    Summary {
        /// Prompt name
        #[arg(short, long)]
        prompt: String,

        /// Restrict to one version
        #[arg(short = 'V', long)]
        version: Option<String>,

        /// Restrict to one model
        #[arg(short, long)]
        model: Option<String>,

        /// Break down per model and award badges
        #[arg(long)]
        by_model: bool,
    },

    /// A/B compare two versions of a prompt on one metric
    Compare {
        /// Prompt name
        #[arg(short, long)]
        prompt: String,

        /// Baseline version
        #[arg(long)]
        baseline: String,

        /// Current version
        #[arg(long)]
        current: String,

        /// Metric to compare (latency, cost, quality, success, tokens or an extra)
        #[arg(long, default_value = "latency")]
        metric: String,

        /// Restrict to one model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Check a version against a baseline for threshold regressions
    Check {
        /// Prompt name
        #[arg(short, long)]
        prompt: String,

        /// Baseline version
        #[arg(long)]
        baseline: String,

        /// Current version
        #[arg(long)]
        current: String,
    },

    /// Print the next semantic version for a bump
    NextVersion {
        /// Current version (omit for a first version)
        #[arg(long)]
        current: Option<String>,

        /// Bump type: major, minor or patch
        #[arg(long, default_value = "patch")]
        bump: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("promptver=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = load_or_default_config(cli.config)?;

    match cli.command {
        Commands::Init { output } => init_config(output),
        Commands::Log {
            prompt,
            version,
            model,
            input_tokens,
            output_tokens,
            latency_ms,
            quality,
            cost,
            failed,
            extras,
        } => log_call(
            &config,
            LogArgs {
                prompt,
                version,
                model,
                input_tokens,
                output_tokens,
                latency_ms,
                quality,
                cost,
                failed,
                extras,
            },
        ),
        Commands::Summary {
            prompt,
            version,
            model,
            by_model,
        } => print_summary(&config, &prompt, version, model, by_model),
        Commands::Compare {
            prompt,
            baseline,
            current,
            metric,
            model,
        } => compare_versions(&config, &prompt, &baseline, &current, &metric, model),
        Commands::Check {
            prompt,
            baseline,
            current,
        } => check_regressions(&config, &prompt, &baseline, &current),
        Commands::NextVersion { current, bump } => print_next_version(current, &bump),
    }
}

struct LogArgs {
    prompt: String,
    version: String,
    model: String,
    input_tokens: u32,
    output_tokens: u32,
    latency_ms: f64,
    quality: Option<f64>,
    cost: Option<f64>,
    failed: bool,
    extras: Vec<String>,
}

/// @ai:intent Log a single call record to the store
/// @ai:effects fs:write
fn log_call(config: &AppConfig, args: LogArgs) -> Result<()> {
    let cost = match args.cost {
        Some(cost) => cost,
        None => config
            .pricing
            .cost(&args.model, args.input_tokens, args.output_tokens)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "no pricing for model '{}'; pass --cost explicitly or add it to the pricing table",
                    args.model
                )
            })?,
    };

    let mut extras = BTreeMap::new();
    for pair in &args.extras {
        let (name, value) = parse_extra(pair)?;
        extras.insert(name, value);
    }

    let record = MetricRecord {
        prompt_name: args.prompt,
        version: args.version,
        model_name: args.model,
        input_tokens: args.input_tokens,
        output_tokens: args.output_tokens,
        latency_ms: args.latency_ms,
        quality_score: args.quality,
        cost,
        success: !args.failed,
        timestamp: Utc::now(),
        extras,
    };

    let store = JsonlStore::new(config.paths.records_file());
    let stored = store.append(record)?;

    tracing::info!(
        "Logged {} {} on {} ({:.0} ms, {:.6} cost)",
        stored.prompt_name,
        stored.version,
        stored.model_name,
        stored.latency_ms,
        stored.cost
    );

    Ok(())
}

/// @ai:intent Parse an extra metric pair like "coherence=0.87"
/// @ai:effects pure
fn parse_extra(pair: &str) -> Result<(String, f64)> {
    let (name, value) = pair
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid extra '{}' (expected NAME=VALUE)", pair))?;

    let value: f64 = value
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid value in extra '{}' (expected a number)", pair))?;

    Ok((name.trim().to_string(), value))
}

/// @ai:intent Print a metrics summary, optionally broken down per model
/// @ai:effects fs:read, io
fn print_summary(
    config: &AppConfig,
    prompt: &str,
    version: Option<String>,
    model: Option<String>,
    by_model: bool,
) -> Result<()> {
    let store = JsonlStore::new(config.paths.records_file());

    let mut filter = RecordFilter::for_prompt(prompt);
    filter.version = version.clone();
    filter.model = model;

    let records = store.query(&filter)?;

    if records.is_empty() {
        println!("No records for prompt '{}'", prompt);
        return Ok(());
    }

    let aggregator = MetricsAggregator::new();

    println!();
    match &version {
        Some(v) => println!("Summary: {} {}", prompt, v),
        None => println!("Summary: {} (all versions)", prompt),
    }
    println!("{}", "=".repeat(40));

    if by_model {
        let by_model = aggregator.summarize_by_model(&records)?;

        for (model, summary) in &by_model {
            println!();
            println!("Model: {}", model);
            println!("{}", "-".repeat(40));
            print_summary_table(&summary.stats);
        }

        let ranker = ModelRanker::new();
        let badges = ranker.rank(&by_model);

        println!();
        println!("Badges");
        println!("{}", "-".repeat(40));
        print_badge("Fastest", badges.fastest.as_deref());
        print_badge("Cheapest", badges.cheapest.as_deref());
        print_badge("Best quality", badges.best_quality.as_deref());
        print_badge("Most reliable", badges.most_reliable.as_deref());
    } else {
        let summary = aggregator.summarize(&records)?;
        print_summary_table(&summary);
    }

    println!();
    Ok(())
}

/// @ai:intent Print one summary as an aligned table
/// @ai:effects io
fn print_summary_table(summary: &Summary) {
    println!("{:<22} {:>12}", "Calls:", summary.call_count);
    print_optional_pct("Success rate:", summary.success_rate);
    print_optional("Avg latency (ms):", summary.avg_latency_ms);
    print_optional("Min latency (ms):", summary.min_latency_ms);
    print_optional("Max latency (ms):", summary.max_latency_ms);
    print_optional("Avg quality:", summary.avg_quality);
    println!("{:<22} {:>12.6}", "Total cost:", summary.total_cost);
    print_optional_precise("Avg cost per call:", summary.avg_cost_per_call);
    print_optional("Avg input tokens:", summary.avg_input_tokens);
    print_optional("Avg output tokens:", summary.avg_output_tokens);
    println!("{:<22} {:>12}", "Total tokens:", summary.total_tokens);

    for (name, value) in &summary.avg_extras {
        println!("{:<22} {:>12.3}", format!("Avg {}:", name), value);
    }
}

fn print_optional(label: &str, value: Option<f64>) {
    match value {
        Some(v) => println!("{:<22} {:>12.2}", label, v),
        None => println!("{:<22} {:>12}", label, "-"),
    }
}

fn print_optional_precise(label: &str, value: Option<f64>) {
    match value {
        Some(v) => println!("{:<22} {:>12.6}", label, v),
        None => println!("{:<22} {:>12}", label, "-"),
    }
}

fn print_optional_pct(label: &str, value: Option<f64>) {
    match value {
        Some(v) => println!("{:<22} {:>11.1}%", label, v * 100.0),
        None => println!("{:<22} {:>12}", label, "-"),
    }
}

fn print_badge(label: &str, winner: Option<&str>) {
    match winner {
        Some(model) => println!("{:<22} {}", format!("{}:", label), model.green()),
        None => println!("{:<22} -", format!("{}:", label)),
    }
}

/// @ai:intent A/B compare two versions on one metric
/// @ai:effects fs:read, io
fn compare_versions(
    config: &AppConfig,
    prompt: &str,
    baseline: &str,
    current: &str,
    metric: &str,
    model: Option<String>,
) -> Result<()> {
    let store = JsonlStore::new(config.paths.records_file());

    let samples = |version: &str| -> Result<Vec<f64>> {
        let mut filter = RecordFilter::for_prompt(prompt).version(version);
        filter.model = model.clone();

        let records = store.query(&filter)?;
        Ok(records
            .iter()
            .filter_map(|r| r.metric_value(metric))
            .collect())
    };

    let samples_a = samples(baseline)?;
    let samples_b = samples(current)?;

    let min_samples = config.ab.min_samples;
    if samples_a.len() < min_samples || samples_b.len() < min_samples {
        anyhow::bail!(
            "need at least {} samples per version for an A/B test (got {} for {}, {} for {})",
            min_samples,
            samples_a.len(),
            baseline,
            samples_b.len(),
            current
        );
    }

    let tester = SignificanceTester::with_threshold(config.ab.z_threshold);
    let comparison = tester.compare(&samples_a, &samples_b, metric)?;

    let verdict = match comparison.verdict {
        Verdict::SignificantImprovement => comparison.verdict.as_str().green().bold(),
        Verdict::SignificantRegression => comparison.verdict.as_str().red().bold(),
        Verdict::Inconclusive => comparison.verdict.as_str().yellow(),
    };

    println!();
    println!("A/B Comparison: {} ({} -> {})", prompt, baseline, current);
    println!("{}", "=".repeat(50));
    println!("{:<22} {}", "Metric:", comparison.metric);
    println!(
        "{:<22} {:>12.4} (n={})",
        "Baseline mean:", comparison.mean_a, comparison.n_a
    );
    println!(
        "{:<22} {:>12.4} (n={})",
        "Current mean:", comparison.mean_b, comparison.n_b
    );
    println!("{:<22} {:>+12.4}", "Difference:", comparison.difference);
    println!("{:<22} {:>12.3}", "Statistic:", comparison.statistic);
    println!("{:<22} {:>11.1}%", "Confidence:", comparison.confidence * 100.0);
    println!("{:<22} {}", "Verdict:", verdict);
    println!();

    Ok(())
}

/// @ai:intent Check a version against a baseline and print any alerts
/// @ai:post exits non-zero when a regression is flagged, for CI gating
/// @ai:effects fs:read, io
fn check_regressions(
    config: &AppConfig,
    prompt: &str,
    baseline: &str,
    current: &str,
) -> Result<()> {
    let store = JsonlStore::new(config.paths.records_file());
    let aggregator = MetricsAggregator::new();

    let baseline_records = store.query(&RecordFilter::for_prompt(prompt).version(baseline))?;
    let current_records = store.query(&RecordFilter::for_prompt(prompt).version(current))?;

    let baseline_summary = aggregator.summarize(&baseline_records)?;
    let current_summary = aggregator.summarize(&current_records)?;

    let monitor = RegressionMonitor::new(config.thresholds.clone());
    let alerts = monitor.check(baseline, current, &baseline_summary, &current_summary);

    println!();
    println!("Regression Check: {} ({} -> {})", prompt, baseline, current);
    println!("{}", "=".repeat(50));

    if alerts.is_empty() {
        println!("{}", "No regressions detected".green());
        println!();
        return Ok(());
    }

    for alert in &alerts {
        let severity = match alert.severity {
            AlertSeverity::Warning => alert.severity.as_str().yellow().bold(),
            AlertSeverity::Critical => alert.severity.as_str().red().bold(),
        };
        println!("[{}] {}", severity, alert.message);
    }

    println!();
    println!("{} alert(s)", alerts.len());
    std::process::exit(1);
}

/// @ai:intent Print the next version for a bump type
/// @ai:effects io
fn print_next_version(current: Option<String>, bump: &str) -> Result<()> {
    let bump: VersionBump = bump.parse()?;
    println!("{}", next_version(current.as_deref(), bump));
    Ok(())
}

/// @ai:intent Initialize default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    let config = AppConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Load configuration or use defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<AppConfig> {
    match path {
        Some(p) => AppConfig::load(&p),
        None => {
            let default_path = PathBuf::from("promptver.toml");

            if default_path.exists() {
                AppConfig::load(&default_path)
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extra_valid() {
        let (name, value) = parse_extra("coherence=0.87").unwrap();
        assert_eq!(name, "coherence");
        assert!((value - 0.87).abs() < 1e-12);
    }

    #[test]
    fn test_parse_extra_missing_separator() {
        assert!(parse_extra("coherence").is_err());
    }

    #[test]
    fn test_parse_extra_bad_number() {
        assert!(parse_extra("coherence=high").is_err());
    }
}
