//! CLI entry point for the CO2 emissions dashboard.
//!
//! `serve` runs the web dashboard; `summarize` runs the aggregation once and
//! prints or exports the result.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use co2_dashboard::analyzers::analyzer::aggregated_emissions;
use co2_dashboard::config::{PipelineConfig, SourceConfig, SourceEncoding, ZeroFlightPolicy};
use co2_dashboard::output::{print_json, print_pretty, write_summary_csv};
use co2_dashboard::server::{AppState, serve};
use std::ffi::OsStr;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "co2_dashboard")]
#[command(about = "Serve flight CO2 emissions aggregated by state", long_about = None)]
struct Cli {
    /// CSV file of flight emissions records
    #[arg(long, env = "EMISSIONS_DATA_PATH", default_value = "data/co2_emissions.csv", global = true)]
    data_path: PathBuf,

    /// Text encoding of the CSV (utf-8 or latin-1)
    #[arg(long, env = "EMISSIONS_ENCODING", default_value = "utf-8", global = true)]
    encoding: SourceEncoding,

    /// How to treat records with zero flights: skip (leave out of the mean) or reject
    #[arg(long, env = "ZERO_FLIGHT_POLICY", default_value = "skip", global = true)]
    zero_flights: ZeroFlightPolicy,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard and its JSON API
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "BIND_ADDR", default_value = "127.0.0.1:5000")]
        bind: SocketAddr,
    },
    /// Aggregate the CSV once and print or export the result
    Summarize {
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// CSV file to write when --format csv is used
        #[arg(short, long, default_value = "summary.csv")]
        output: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/co2_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("co2_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig {
        source: SourceConfig::new(cli.data_path, cli.encoding),
        zero_flights: cli.zero_flights,
    };
    info!(
        data_path = %config.source.path.display(),
        encoding = %config.source.encoding,
        zero_flights = %config.zero_flights,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Serve { bind } => {
            serve(bind, AppState::new(config)).await?;
        }
        Commands::Summarize { format, output } => {
            let rows = aggregated_emissions(&config)?;

            match format {
                Format::Pretty => print_pretty(&rows),
                Format::Json => print_json(&rows)?,
                Format::Csv => write_summary_csv(&output, &rows)?,
            }
        }
    }

    Ok(())
}
