//! CLI entry point for the air-quality chart pipeline.
//!
//! Provides subcommands that compute the trend, ventilation and weekly
//! pattern charts for one pollutant, and a publish command that uploads
//! every chart for every pollutant to S3.

use airq_charts::{
    charts::{compute_heatmap, compute_trends, compute_ventilation},
    config::PollutantCatalog,
    dataset::load_source,
    output::{print_json, print_pretty, write_csv, write_json},
    publish::publish_all,
};
use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "airq_charts")]
#[command(about = "Compute chart data from indoor/outdoor air-quality sensors", long_about = None)]
struct Cli {
    /// JSON file replacing the builtin pollutant table
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 24-hour rolling means, data gaps and overall means
    Trends {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Pollutant key (pm25, pm10, no2)
        #[arg(short, long, default_value = "pm25")]
        pollutant: String,

        /// JSON file to write the chart to
        #[arg(short, long)]
        output: Option<String>,

        /// CSV file to write the rolling points to
        #[arg(long)]
        csv: Option<String>,

        /// CSV file to write the gap intervals to
        #[arg(long)]
        gaps_csv: Option<String>,
    },
    /// Indoor distributions per ventilation method
    Ventilation {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        #[arg(short, long, default_value = "pm25")]
        pollutant: String,

        #[arg(short, long)]
        output: Option<String>,

        /// Seed for device-balancing; random when omitted
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Day-of-week by hour-of-day heatmap
    Patterns {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        #[arg(short, long, default_value = "pm25")]
        pollutant: String,

        #[arg(short, long)]
        output: Option<String>,

        /// CSV file to write the heatmap cells to
        #[arg(long)]
        csv: Option<String>,
    },
    /// Compute every chart for every pollutant and upload to S3
    Publish {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// S3 bucket name to upload chart JSON to (e.g., "my-bucket")
        #[arg(long)]
        s3_bucket: String,

        /// Key prefix inside the bucket
        #[arg(long, default_value = "charts")]
        prefix: String,

        /// Gzip compress chart JSON before uploading
        #[arg(long, default_value_t = false)]
        gzip: bool,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/airq_charts.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("airq_charts.log"));

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

    let catalog = match &cli.config {
        Some(path) => {
            info!(path = %path, "Loading pollutant config");
            PollutantCatalog::load(path)?
        }
        None => PollutantCatalog::builtin(),
    };
    let token = std::env::var("DATASET_TOKEN").ok();

    match cli.command {
        Commands::Trends {
            source,
            pollutant,
            output,
            csv,
            gaps_csv,
        } => {
            let config = catalog.require(&pollutant)?;
            let rows = load_source(&source, token.as_deref()).await?;
            let chart = compute_trends(&rows, config);

            if let Some(path) = csv {
                write_csv(&path, &chart.points)?;
            }
            if let Some(path) = gaps_csv {
                write_csv(&path, &chart.gaps)?;
            }
            emit(output.as_deref(), &chart)?;
        }
        Commands::Ventilation {
            source,
            pollutant,
            output,
            seed,
        } => {
            let config = catalog.require(&pollutant)?;
            let rows = load_source(&source, token.as_deref()).await?;
            let mut rng = make_rng(seed);
            let chart = compute_ventilation(&rows, config, &mut rng);

            emit(output.as_deref(), &chart)?;
        }
        Commands::Patterns {
            source,
            pollutant,
            output,
            csv,
        } => {
            let config = catalog.require(&pollutant)?;
            let rows = load_source(&source, token.as_deref()).await?;
            let chart = compute_heatmap(&rows, config);

            if let Some(path) = csv {
                write_csv(&path, &chart.cells)?;
            }
            emit(output.as_deref(), &chart)?;
        }
        Commands::Publish {
            source,
            s3_bucket,
            prefix,
            gzip,
            seed,
        } => {
            if s3_bucket.is_empty() {
                info!("S3 bucket not specified, skipping upload");
                return Ok(());
            }

            let rows = load_source(&source, token.as_deref()).await?;
            let aws = aws_config::load_from_env().await;
            let s3 = aws_sdk_s3::Client::new(&aws);
            let mut rng = make_rng(seed);

            info!(bucket = %s3_bucket, gzip, "S3 upload enabled");
            publish_all(&s3, &s3_bucket, &prefix, &rows, &catalog, &mut rng, gzip).await?;
        }
    }

    Ok(())
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Writes the chart to `output` when given, otherwise logs it.
fn emit<T: Serialize + std::fmt::Debug>(output: Option<&str>, chart: &T) -> Result<()> {
    match output {
        Some(path) => write_json(path, chart),
        None => {
            print_pretty(chart);
            print_json(chart)
        }
    }
}
