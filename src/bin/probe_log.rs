//! Probe: Torn `log` selection
//!
//! Fetches the log for one API key and documents:
//! - Raw response shape (first entry)
//! - All money-receive entries, newest first
//! - The entry the watcher would notify about, with the resolved sender

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use torn_money_watcher::TORN_API_BASE;
use torn_money_watcher::api::{TornClient, parse_base_url};
use torn_money_watcher::detector::{latest_money_receive, money_receive};
use torn_money_watcher::resolver::resolve_username;

#[derive(Parser)]
#[command(name = "probe_log", about = "Inspect money-receive entries for one API key")]
struct Args {
    /// Torn API key
    #[arg(long)]
    key: String,

    /// Torn API base URL
    #[arg(long, default_value = TORN_API_BASE)]
    base: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let http = reqwest::Client::new();

    println!("=== Probe: Torn log ===");
    println!();

    println!("--- 1. Raw response ---");
    let url = parse_base_url(&args.base)?.join("user/")?;
    let body: Value = http
        .get(url)
        .query(&[("selections", "log"), ("key", args.key.as_str())])
        .send()
        .await?
        .json()
        .await?;
    match body.get("log").and_then(Value::as_object) {
        Some(log) => {
            println!("Entry count: {}", log.len());
            if let Some(first) = log.values().next() {
                println!("{}", serde_json::to_string_pretty(first)?);
            }
        }
        None => {
            println!("No log object in response:");
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }
    println!();

    println!("--- 2. Money-receive entries ---");
    let client = TornClient::new(http, &args.base)?;
    let entries = client
        .fetch_log(&args.key)
        .await
        .context("log fetch failed")?
        .unwrap_or_default();
    let mut receives: Vec<_> = entries.iter().filter_map(money_receive).collect();
    receives.sort_by_key(|m| std::cmp::Reverse(m.timestamp));
    for m in &receives {
        let when = m
            .event_time()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| m.timestamp.to_string());
        println!("  {when}  sender={} money={}", m.sender, m.money);
    }
    println!("Total: {}", receives.len());
    println!();

    println!("--- 3. Would notify ---");
    match latest_money_receive(&entries) {
        Some(latest) => {
            let sender = resolve_username(&client, latest.sender, &args.key).await;
            println!(
                "timestamp={} money={} sender={sender}",
                latest.timestamp, latest.money
            );
        }
        None => println!("Nothing to notify"),
    }

    Ok(())
}
