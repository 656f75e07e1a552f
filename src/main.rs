//! etl2pcap: convert NDIS packet capture ETL traces into pcap files.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use etl2pcap::{convert_etl_to_pcap, ConversionSummary};

#[derive(Debug, Parser)]
#[command(name = "etl2pcap")]
#[command(about = "Convert an NDIS packet capture ETL trace into a pcap file")]
#[command(version)]
struct Command {
    /// Input ETL trace file
    input: PathBuf,

    /// Output pcap file (created or overwritten)
    output: PathBuf,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Summary format: text, json
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or("-".to_string(), |ts| {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    })
}

fn write_summary(out: &mut impl Write, summary: &ConversionSummary, format: &str) -> Result<()> {
    if format == "json" {
        serde_json::to_writer_pretty(&mut *out, summary)?;
        writeln!(out)?;
        return Ok(());
    }

    let stats = &summary.statistics;
    writeln!(out, "Total events:      {}", stats.total_events_seen)?;
    writeln!(out, "NDIS events:       {}", stats.matched_events_seen)?;
    writeln!(out, "Buffers:           {}", stats.buffers_seen)?;
    writeln!(out, "Oldest timestamp:  {}", format_timestamp(stats.oldest_timestamp))?;
    writeln!(out, "Newest timestamp:  {}", format_timestamp(stats.newest_timestamp))?;
    writeln!(out, "Packets written:   {}", summary.packets_written)?;
    writeln!(out, "Elapsed:           {:.3?}", summary.elapsed)?;
    Ok(())
}

fn main() -> Result<()> {
    let opts = Command::parse();
    init_logging(opts.verbose);

    let summary = convert_etl_to_pcap(&opts.input, &opts.output).with_context(|| {
        format!(
            "Failed to convert {} to {}",
            opts.input.display(),
            opts.output.display()
        )
    })?;

    write_summary(&mut io::stdout().lock(), &summary, &opts.format)
}
