//! tube-comments main entry point
//!
//! Command-line interface for downloading the comment tree of a video
//! without the platform API.

use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tube_comments::config::DEFAULT_BASE_URL;
use tube_comments::{crawl, CrawlConfig, JsonLinesSink};

/// Download the comments of a video without using the platform API
#[derive(Parser, Debug)]
#[command(name = "tube-comments")]
#[command(version)]
#[command(about = "Download video comments without the platform API", long_about = None)]
struct Cli {
    /// ID of the video for which to download the comments
    #[arg(short = 'y', long = "youtubeid", value_name = "ID")]
    youtube_id: String,

    /// Output filename (output format is line-delimited JSON)
    #[arg(short, long, value_name = "PATH")]
    output: PathBuf,

    /// Download comments ordered by time instead of relevance
    #[arg(short = 't', long = "time")]
    time: bool,

    /// Seconds to sleep between requests
    #[arg(long, default_value_t = 1, value_name = "SECS")]
    delay: u64,

    /// Seconds to back off after a 503 response
    #[arg(long, default_value_t = 10, value_name = "SECS")]
    backoff: u64,

    /// Platform origin to request against (for testing)
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL, hide = true)]
    base_url: String,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = CrawlConfig {
        base_url: cli.base_url.clone(),
        order_by_time: cli.time,
        request_delay: Duration::from_secs(cli.delay),
        rate_limit_backoff: Duration::from_secs(cli.backoff),
        ..CrawlConfig::default()
    };

    if !cli.quiet {
        println!("Downloading comments for video: {}", cli.youtube_id);
    }

    let file = File::create(&cli.output)
        .with_context(|| format!("failed to create output file {}", cli.output.display()))?;
    let show_progress = !cli.quiet;
    let mut sink = JsonLinesSink::new(BufWriter::new(file)).with_progress(move |count| {
        if show_progress {
            print!("\rDownloaded {} comment(s)", count);
            let _ = io::stdout().flush();
        }
    });

    let count = crawl(&cli.youtube_id, config, &mut sink)
        .await
        .with_context(|| format!("crawl failed for video {}", cli.youtube_id))?;

    if !cli.quiet {
        println!();
        println!("Done! {} comment(s) written to {}", count, cli.output.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tube_comments=warn"),
            1 => EnvFilter::new("tube_comments=info,warn"),
            2 => EnvFilter::new("tube_comments=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(io::stderr)
        .init();
}
