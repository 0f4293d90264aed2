//! `barrage run`: submit a profile, follow the job, print a summary

use anyhow::{Context, Result};
use barrage_client::BarrageClient;
use barrage_core::domain::job::JobStatus;
use barrage_core::domain::profile::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_MS, HttpMethod, LoadProfile};
use barrage_core::domain::result::RequestResult;
use barrage_core::dto::job::JobPoll;
use clap::Args;
use colored::*;
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use crate::commands::job::colorize_status;
use crate::summary::RunSummary;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Target URL (http or https)
    pub url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: HttpMethod,

    /// Total number of requests
    #[arg(short = 'n', long, default_value_t = 100)]
    pub iterations: u32,

    /// Requests per wave
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: u32,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Synthetic POST body size in KB
    #[arg(long, default_value_t = 0)]
    pub payload_kb: u32,

    /// Append a unique query parameter to every request
    #[arg(long)]
    pub cache_bust: bool,

    /// Extra request header, `Name: value`; repeatable
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Poll interval in milliseconds
    #[arg(long, default_value_t = 500)]
    pub poll_ms: u64,
}

impl RunArgs {
    pub fn to_profile(&self) -> LoadProfile {
        LoadProfile {
            target_url: self.url.clone(),
            method: self.method,
            iterations: self.iterations,
            concurrency: self.concurrency,
            timeout_ms: self.timeout_ms,
            payload_size_kb: self.payload_kb,
            cache_busting: self.cache_bust,
            headers: self.headers.iter().cloned().collect::<HashMap<_, _>>(),
        }
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

pub async fn handle_run(args: RunArgs, client: &BarrageClient) -> Result<()> {
    let profile = args.to_profile();

    let job_id = client
        .submit_job(&profile)
        .await
        .context("Failed to submit job")?;

    println!(
        "{} Job {} started: {} x {} {} (concurrency {})",
        "✓".green(),
        job_id.to_string().cyan(),
        profile.iterations,
        profile.method,
        profile.target_url,
        profile.concurrency
    );
    println!("{}", "Press Ctrl-C to cancel.".dimmed());

    let mut ticker = tokio::time::interval(Duration::from_millis(args.poll_ms.max(10)));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut cancel_sent = false;
    let mut collected = Collected::default();

    let final_poll = loop {
        tokio::select! {
            _ = &mut ctrl_c, if !cancel_sent => {
                cancel_sent = true;
                println!();
                match client.cancel_job(job_id).await {
                    Ok(_) => println!("{}", "Cancelling job...".yellow()),
                    Err(e) if e.is_conflict() => {}
                    Err(e) => eprintln!("{} Failed to cancel job: {}", "✗".red(), e),
                }
            }
            _ = ticker.tick() => {
                let poll = client
                    .poll_job(job_id)
                    .await
                    .with_context(|| format!("Failed to poll job {}", job_id))?;

                collected.absorb(&poll);
                print_progress(poll.status, poll.progress, poll.total);

                if poll.status.is_terminal() {
                    println!();
                    break poll;
                }
            }
        }
    };

    let results = collected.into_sorted();

    println!();
    println!("Job finished: {}", colorize_status(final_poll.status));
    if let Some(error) = &final_poll.error {
        println!("  Error: {}", error.red());
    }
    println!();

    RunSummary::from_results(&results).print();

    if final_poll.status == JobStatus::Failed {
        anyhow::bail!("job {} failed", job_id);
    }
    Ok(())
}

/// Results gathered across polls
///
/// Grows with what the server delivers rather than reserving room for the
/// whole job up front.
#[derive(Debug, Default)]
struct Collected {
    results: Vec<RequestResult>,
}

impl Collected {
    fn absorb(&mut self, poll: &JobPoll) {
        self.results.extend(poll.new_results.iter().cloned());
    }

    /// Results arrive in settlement order; sort once for display.
    fn into_sorted(mut self) -> Vec<RequestResult> {
        self.results.sort_by_key(|r| r.id);
        self.results
    }
}

fn print_progress(status: JobStatus, progress: usize, total: u32) {
    let percent = if total == 0 {
        100.0
    } else {
        progress as f64 * 100.0 / f64::from(total)
    };
    print!(
        "\r  {} {}/{} ({:.0}%)   ",
        colorize_status(status),
        progress,
        total,
        percent
    );
    let _ = std::io::stdout().flush();
}
