mod config;
mod error;
mod fetch;
mod logging;
mod parser;
mod pipeline;
mod probe;
mod prompt;
mod ranker;
mod scheduler;
#[cfg(test)]
mod test_support;
mod traits;
mod types;
mod utils;
mod writer;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use config::Settings;
use fetch::HttpFetcher;
use pipeline::{Outcome, Pipeline};
use probe::HttpSpeedProbe;
use prompt::{AssumeYes, StdinPrompter};
use scheduler::ProbeScheduler;
use std::path::PathBuf;
use std::sync::Arc;
use traits::Prompter;

#[derive(Parser)]
#[command(name = "mirrorrank")]
#[command(about = "Rank Arch Linux mirrors by download speed and write the fastest to the mirrorlist", long_about = None)]
struct Cli {
    /// Settings file (default: ~/.config/mirrorrank/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe all mirrors and write the fastest to the mirrorlist
    Rank {
        #[command(flatten)]
        probe: ProbeArgs,

        /// Output mirrorlist path
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Backup path for the previous mirrorlist
        #[arg(long)]
        backup: Option<PathBuf>,

        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,

        /// Skip the package database sync after writing
        #[arg(long)]
        no_sync: bool,
    },
    /// Probe all mirrors and print the results without writing anything
    Test {
        #[command(flatten)]
        probe: ProbeArgs,

        /// Print probe results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore the mirrorlist from its backup
    Restore {
        /// Output mirrorlist path
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Backup path
        #[arg(long)]
        backup: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ProbeArgs {
    /// Number of mirrors to keep
    #[arg(long, short = 'n')]
    top: Option<usize>,

    /// Per-mirror timeout in seconds
    #[arg(long, short)]
    timeout: Option<u64>,

    /// Maximum number of concurrent probes
    #[arg(long, short)]
    concurrency: Option<usize>,

    /// Mirror directory URL
    #[arg(long)]
    url: Option<String>,
}

impl ProbeArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(n) = self.top {
            settings.top_n = n;
        }
        if let Some(t) = self.timeout {
            settings.timeout_secs = t;
        }
        if let Some(c) = self.concurrency {
            settings.concurrency = c;
        }
        if let Some(ref url) = self.url {
            settings.source_url = url.clone();
        }
    }
}

fn apply_paths(settings: &mut Settings, output: Option<PathBuf>, backup: Option<PathBuf>) {
    if let Some(o) = output {
        settings.output_path = o;
    }
    if let Some(b) = backup {
        settings.backup_path = b;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(logging::LogOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
    });

    let mut settings = Settings::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Rank {
            probe,
            output,
            backup,
            yes,
            no_sync,
        } => {
            probe.apply(&mut settings);
            apply_paths(&mut settings, output, backup);
            handle_rank(&settings, yes, !no_sync, cli.quiet).await?
        }
        Commands::Test { probe, json } => {
            probe.apply(&mut settings);
            handle_test(&settings, json, cli.quiet).await?
        }
        Commands::Restore { output, backup } => {
            apply_paths(&mut settings, output, backup);
            handle_restore(&settings).await?
        }
    }

    Ok(())
}

// --- Handlers ---

fn build_scheduler(settings: &Settings, show_progress: bool) -> Result<ProbeScheduler> {
    let probe = HttpSpeedProbe::new(&settings.probe_path, settings.timeout())?;
    let scheduler = ProbeScheduler::new(Arc::new(probe));
    Ok(if show_progress {
        scheduler.with_progress()
    } else {
        scheduler
    })
}

async fn handle_rank(settings: &Settings, yes: bool, sync: bool, quiet: bool) -> Result<()> {
    if settings.top_n == 0 {
        bail!("--top must be at least 1");
    }

    // 测速之前先检查权限, 避免白白等待
    utils::check_write_access(&settings.output_path).await?;

    let fetcher = HttpFetcher::new(settings.fetch_timeout())?;
    let scheduler = build_scheduler(settings, !quiet)?;
    let prompter: Box<dyn Prompter> = if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinPrompter)
    };

    let pipeline = Pipeline {
        settings,
        fetcher: &fetcher,
        scheduler: &scheduler,
        prompter: prompter.as_ref(),
    };

    match pipeline.run(sync).await? {
        Outcome::Written { count } => {
            println!(
                "Success! {} mirrors written to {}.",
                count,
                settings.output_path.display()
            );
            println!(
                "Previous mirrorlist (if any) saved to {}.",
                settings.backup_path.display()
            );
        }
        Outcome::Declined => println!("No changes made."),
    }
    Ok(())
}

async fn handle_test(settings: &Settings, json: bool, quiet: bool) -> Result<()> {
    let fetcher = HttpFetcher::new(settings.fetch_timeout())?;
    let scheduler = build_scheduler(settings, !quiet && !json)?;
    let pipeline = Pipeline {
        settings,
        fetcher: &fetcher,
        scheduler: &scheduler,
        prompter: &AssumeYes,
    };

    let (mut results, ranking) = pipeline.survey().await?;
    results.sort_by(|a, b| b.throughput.cmp(&a.throughput));

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!();
    println!("{:<5} {:<14} {:<12} {:<20} URL", "RANK", "SPEED", "TYPE", "REGION");
    println!("{}", "-".repeat(90));

    for (i, r) in results.iter().enumerate() {
        println!(
            "{:<5} {:<14} {:<12} {:<20} {}",
            i + 1,
            utils::format_throughput(r.throughput),
            format!("{}/{}", r.transport, r.family),
            r.region,
            r.endpoint
        );
    }

    if let Some(best) = ranking.selection.first() {
        println!("{}", "-".repeat(90));
        println!(
            "Fastest: {} ({}, {}).",
            best.endpoint,
            best.region,
            utils::format_throughput(best.throughput)
        );
        println!("Run 'mirrorrank rank -n {}' to apply.", settings.top_n);
    }

    Ok(())
}

async fn handle_restore(settings: &Settings) -> Result<()> {
    println!("Restoring {}...", settings.output_path.display());
    utils::restore_backup(&settings.output_path, &settings.backup_path).await?;
    println!("Success! mirrorlist restored.");
    Ok(())
}
