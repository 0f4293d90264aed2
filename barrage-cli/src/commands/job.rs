//! Job command handlers
//!
//! One-shot commands against existing jobs: status, cancel and list.

use anyhow::{Context, Result};
use barrage_client::BarrageClient;
use barrage_core::domain::job::JobStatus;
use barrage_core::domain::result::RequestResult;
use barrage_core::dto::job::JobSummary;
use colored::*;

use crate::id_resolver::resolve_job_id;
use crate::types::IdOrPrefix;

/// Poll a job once
///
/// Polling advances the job's delivery cursor, so results shown here will
/// not be delivered to another poller.
pub async fn show_status(client: &BarrageClient, id: &str) -> Result<()> {
    let id = resolve_job_id(client, &IdOrPrefix::parse(id)).await?;
    let poll = match client.poll_job(id).await {
        Ok(poll) => poll,
        Err(e) if e.is_not_found() => {
            anyhow::bail!(
                "Job {} not found (finished jobs are evicted after the retention window)",
                id
            )
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to poll job {}", id)),
    };

    println!("{}", "Job Status:".bold());
    println!("  ID:       {}", id.to_string().cyan());
    println!("  Status:   {}", colorize_status(poll.status));
    println!("  Progress: {}/{}", poll.progress, poll.total);

    if let Some(error) = &poll.error {
        println!("  Error:    {}", error.red());
    }

    if poll.new_results.is_empty() {
        println!("\n{}", "No new results since the last poll.".dimmed());
    } else {
        println!(
            "\n{}",
            format!("{} new result(s):", poll.new_results.len()).bold()
        );
        for result in &poll.new_results {
            print_result(result);
        }
    }

    Ok(())
}

pub async fn cancel(client: &BarrageClient, id: &str) -> Result<()> {
    let id = resolve_job_id(client, &IdOrPrefix::parse(id)).await?;

    match client.cancel_job(id).await {
        Ok(response) => {
            println!(
                "{} Cancellation requested for job {} (status: {})",
                "✓".green(),
                response.job_id.to_string().cyan(),
                colorize_status(response.status)
            );
            Ok(())
        }
        Err(e) if e.is_conflict() => {
            println!("{} {}", "⚠".yellow(), e);
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to cancel job {}", id)),
    }
}

pub async fn list(client: &BarrageClient) -> Result<()> {
    let jobs = client.list_jobs().await.context("Failed to list jobs")?;

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in &jobs {
            print_job_summary(job);
        }
    }

    Ok(())
}

fn print_job_summary(job: &JobSummary) {
    println!("  {} Job {}", "▸".cyan(), job.id.to_string().dimmed());
    println!("    Target:   {} {}", job.method, job.target_url);
    println!("    Status:   {}", colorize_status(job.status));
    println!("    Progress: {}/{}", job.progress, job.total);
    println!(
        "    Created:  {}",
        job.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    if let Some(finished) = job.finished_at {
        println!(
            "    Finished: {}",
            finished.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    println!();
}

pub fn print_result(result: &RequestResult) {
    let mark = if result.success {
        "✓".green()
    } else {
        "✗".red()
    };

    match &result.error_message {
        Some(error) => println!(
            "  {} #{:<6} {:>9.2}ms  {}",
            mark,
            result.id,
            result.duration,
            error.red()
        ),
        None => println!(
            "  {} #{:<6} {:>9.2}ms  {}",
            mark, result.id, result.duration, result.status
        ),
    }
}

/// Colorize job status for display
pub fn colorize_status(status: JobStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        JobStatus::Running => label.cyan(),
        JobStatus::Completed => label.green(),
        JobStatus::Failed => label.red(),
        JobStatus::Cancelled => label.dimmed(),
    }
}
