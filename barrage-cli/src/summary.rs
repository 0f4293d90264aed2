//! End-of-run statistics
//!
//! Latency figures only consider requests that received a response;
//! timeouts and network errors would otherwise pin the tail to the timeout.

use barrage_core::domain::result::RequestResult;
use colored::*;
use std::collections::{BTreeMap, HashMap};

const TOP_ERRORS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Latency {
    pub min: f64,
    pub mean: f64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    /// Response count per HTTP status; 0 collects requests with no response
    pub status_counts: BTreeMap<u16, usize>,
    pub latency: Option<Latency>,
    /// Most frequent error messages, most frequent first
    pub top_errors: Vec<(String, usize)>,
}

impl RunSummary {
    pub fn from_results(results: &[RequestResult]) -> Self {
        let successes = results.iter().filter(|r| r.success).count();

        let mut status_counts = BTreeMap::new();
        for result in results {
            *status_counts.entry(result.status).or_insert(0) += 1;
        }

        let mut durations: Vec<f64> = results
            .iter()
            .filter(|r| !r.is_failed())
            .map(|r| r.duration)
            .collect();
        durations.sort_by(f64::total_cmp);

        let mut errors: HashMap<&str, usize> = HashMap::new();
        for message in results.iter().filter_map(|r| r.error_message.as_deref()) {
            *errors.entry(message).or_insert(0) += 1;
        }
        let mut top_errors: Vec<(String, usize)> = errors
            .into_iter()
            .map(|(message, count)| (message.to_string(), count))
            .collect();
        top_errors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_errors.truncate(TOP_ERRORS);

        Self {
            total: results.len(),
            successes,
            failures: results.len() - successes,
            status_counts,
            latency: latency(&durations),
            top_errors,
        }
    }

    pub fn print(&self) {
        println!("{}", "Summary:".bold());
        println!("  Requests:   {}", self.total);
        println!("  Successes:  {}", self.successes.to_string().green());
        println!("  Failures:   {}", self.failures.to_string().red());

        if !self.status_counts.is_empty() {
            println!("\n{}", "Status codes:".bold());
            for (status, count) in &self.status_counts {
                let label = match status {
                    0 => "no response".dimmed(),
                    200..=299 => status.to_string().green(),
                    400..=599 => status.to_string().red(),
                    _ => status.to_string().yellow(),
                };
                println!("  {:>12}  {}", label, count);
            }
        }

        if let Some(latency) = &self.latency {
            println!("\n{}", "Latency (ms):".bold());
            println!("  min  {:>10.2}", latency.min);
            println!("  mean {:>10.2}", latency.mean);
            println!("  p50  {:>10.2}", latency.p50);
            println!("  p90  {:>10.2}", latency.p90);
            println!("  p99  {:>10.2}", latency.p99);
            println!("  max  {:>10.2}", latency.max);
        }

        if !self.top_errors.is_empty() {
            println!("\n{}", "Top errors:".bold());
            for (message, count) in &self.top_errors {
                println!("  {:>6}x  {}", count, message.red());
            }
        }
    }
}

/// `sorted` must be in ascending order
fn latency(sorted: &[f64]) -> Option<Latency> {
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

    Some(Latency {
        min,
        mean,
        p50: percentile(sorted, 50.0),
        p90: percentile(sorted, 90.0),
        p99: percentile(sorted, 99.0),
        max,
    })
}

/// Nearest-rank percentile
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
