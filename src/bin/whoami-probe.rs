use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use serde_json::Value;
use tokio::sync::Semaphore;

/// Hit a whoami-server (usually through a load balancer) repeatedly and
/// report which backends answered.
#[derive(Parser)]
#[command(name = "whoami-probe")]
#[command(about = "Observe load-balancer spread across whoami-server instances", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Total number of requests
    #[arg(short = 'n', long, default_value_t = 20)]
    count: usize,

    /// Requests in flight at once
    #[arg(short, long, default_value_t = 4)]
    concurrency: usize,

    /// Print the tally as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Default)]
struct Tally {
    hosts: BTreeMap<String, usize>,
    errors: usize,
    slowest: Duration,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let endpoint = api_endpoint(&cli.url)?;

    let permits = Arc::new(Semaphore::new(cli.concurrency.max(1)));
    let mut tasks = Vec::with_capacity(cli.count);
    for _ in 0..cli.count {
        let permit = permits.clone().acquire_owned().await?;
        let client = client.clone();
        let endpoint = endpoint.clone();
        tasks.push(tokio::spawn(async move {
            let start = Instant::now();
            let result = probe(&client, endpoint).await;
            drop(permit);
            (result, start.elapsed())
        }));
    }

    let mut tally = Tally::default();
    for task in tasks {
        let (result, elapsed) = task.await?;
        tally.slowest = tally.slowest.max(elapsed);
        match result {
            Ok(hostname) => *tally.hosts.entry(hostname).or_default() += 1,
            Err(e) => {
                eprintln!("Error: {}", e);
                tally.errors += 1;
            }
        }
    }

    print_tally(&tally, cli.json)?;
    Ok(())
}

/// `{base}/api`, keeping any path prefix on the base URL.
fn api_endpoint(base: &str) -> Result<reqwest::Url, url::ParseError> {
    let mut base = reqwest::Url::parse(base)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("api")
}

async fn probe(client: &reqwest::Client, endpoint: reqwest::Url) -> Result<String, reqwest::Error> {
    let doc: Value = client
        .get(endpoint)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(doc
        .get("hostname")
        .and_then(Value::as_str)
        .unwrap_or("<unknown>")
        .to_string())
}

fn print_tally(tally: &Tally, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let out = serde_json::json!({
            "hosts": tally.hosts,
            "errors": tally.errors,
            "slowest_ms": tally.slowest.as_millis() as u64,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let total: usize = tally.hosts.values().sum::<usize>() + tally.errors;
    for (host, hits) in &tally.hosts {
        let share = if total > 0 { *hits as f64 * 100.0 / total as f64 } else { 0.0 };
        println!("{:<40} {:>6} {:>6.1}%", host, hits, share);
    }
    if tally.errors > 0 {
        println!("{:<40} {:>6}", "errors", tally.errors);
    }
    println!("slowest response: {:?}", tally.slowest);
    Ok(())
}
