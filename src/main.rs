use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use theatre_seating::config::{Config, LoggingConfig};
use theatre_seating::input::{self, InputFormat};
use theatre_seating::logging::init_logging;
use theatre_seating::present::{self, OutputFormat};
use theatre_seating::search::{search, SearchConfig, DEFAULT_MAX_GUESTS};

/// Finds the seating order along a theatre row that maximises everyone's utility.
#[derive(Debug, Parser)]
#[command(name = "theatre-seating", author, version, about)]
struct Cli {
    /// Guest list file (text, or JSON when it ends in `.json`).
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Force the input format instead of guessing from the extension.
    #[arg(long, value_name = "FORMAT")]
    format: Option<InputFormat>,

    /// Result format: text or json.
    #[arg(short, long, value_name = "FORMAT", default_value = "text", env = "SEATING_OUTPUT")]
    output: OutputFormat,

    /// Refuse guest lists larger than this.
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_MAX_GUESTS, env = "SEATING_MAX_GUESTS")]
    max_guests: usize,

    /// Print at most this many tied arrangements (all are counted).
    #[arg(long, value_name = "COUNT", env = "SEATING_MAX_WINNERS")]
    max_winners: Option<usize>,

    /// Give up after this many milliseconds.
    #[arg(long, value_name = "MS", env = "SEATING_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Search first-seat partitions in parallel.
    #[arg(long, env = "SEATING_PARALLEL")]
    parallel: bool,

    /// Tracing level (RUST_LOG takes precedence).
    #[arg(long, value_name = "LEVEL", default_value = "warn", env = "SEATING_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            input: self.input,
            input_format: self.format,
            output: self.output,
            search: SearchConfig {
                max_guests: self.max_guests,
                max_winners: self.max_winners,
                timeout: self.timeout_ms.map(Duration::from_millis),
                parallel: self.parallel,
            },
            logging: LoggingConfig {
                tracing_level: self.log_level,
                json: self.log_json,
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    let mut config = Cli::parse().into_config();
    config.validate()?;
    init_logging(&config.logging);

    let guests = input::load(&config.input, config.input_format)
        .with_context(|| format!("loading guest list from {}", config.input.display()))?;
    let seating = search(&guests, &config.search).context("searching for the optimal seating")?;
    let rendered = present::render(&seating, config.output).context("rendering the result")?;
    print!("{rendered}");
    if config.output == OutputFormat::Json {
        println!();
    }
    Ok(())
}
