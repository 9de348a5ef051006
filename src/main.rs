//! BTP relay monitor - Entry Point

use btp_monitor::config::CliOverrides;
use btp_monitor::model::{EventKind, LinkKey};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// BTP relay monitor - live event log and link status dashboard
#[derive(Parser, Debug)]
#[command(name = "btp-monitor")]
#[command(version)]
#[command(about = "Terminal dashboard for a BTP relay monitor backend")]
pub struct Args {
    /// Monitor backend base URL (e.g. http://localhost:8000)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Event classes to show, comma separated (log,tx,rx,state)
    #[arg(short, long, value_delimiter = ',', value_parser = parse_event_kind)]
    pub events: Option<Vec<EventKind>>,

    /// Only show events of one link direction, written as SRC:DST
    #[arg(short, long)]
    pub link: Option<LinkKey>,

    /// Slow poll interval in milliseconds (live edge and retries)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_ms: Option<u64>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            url: self.url.clone(),
            events: self.events.clone(),
            link: self.link.clone(),
            poll_ms: self.poll_ms,
        }
    }
}

fn parse_event_kind(raw: &str) -> Result<EventKind, String> {
    let tag = raw.trim();
    if tag.is_empty() {
        return Err("event class must not be empty".to_string());
    }
    Ok(EventKind::from(tag.to_lowercase()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = btp_monitor::config::resolve(args.config.clone(), args.overrides())?;

    btp_monitor::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    btp_monitor::view::run_monitor(&config)?;

    Ok(())
}
