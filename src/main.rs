use clap::{Parser, ValueEnum};
use faucet_dispatch::application::registry::Registry;
use faucet_dispatch::config::FaucetConfig;
use faucet_dispatch::domain::ports::NotificationSinkRef;
use faucet_dispatch::infrastructure::in_memory::TracingNotificationSink;
use faucet_dispatch::interfaces::csv::notification_writer::CsvNotificationSink;
use faucet_dispatch::interfaces::csv::request_reader::RequestReader;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Where notifications are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NotifyTarget {
    /// `origin,outcome,message` rows on stdout
    Csv,
    /// Log lines on stderr
    Log,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Payout requests CSV file (destination,recipient,amount,origin)
    input: PathBuf,

    /// Faucet configuration file (JSON)
    #[arg(long, env = "FAUCET_CONFIG")]
    config: PathBuf,

    /// Overrides the configured time between drains
    #[arg(long, value_name = "MS")]
    tick_interval_ms: Option<u64>,

    /// Overrides the configured per-destination queue capacity
    #[arg(long, value_name = "N")]
    queue_capacity: Option<usize>,

    /// How long to keep the workers running after intake. Defaults to two
    /// tick intervals.
    #[arg(long, value_name = "MS")]
    linger_ms: Option<u64>,

    #[arg(long, value_enum, default_value_t = NotifyTarget::Csv)]
    notify: NotifyTarget,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries the notification CSV; logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    let mut config = FaucetConfig::load(&cli.config).into_diagnostic()?;
    if let Some(tick_interval_ms) = cli.tick_interval_ms {
        config = config.with_tick_interval_ms(tick_interval_ms);
    }
    if let Some(queue_capacity) = cli.queue_capacity {
        config = config.with_queue_capacity(queue_capacity);
    }

    let sink: NotificationSinkRef = match cli.notify {
        NotifyTarget::Csv => Arc::new(CsvNotificationSink::new(io::stdout())),
        NotifyTarget::Log => Arc::new(TracingNotificationSink),
    };
    let registry = Registry::from_config(&config, sink)
        .await
        .into_diagnostic()?;

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = RequestReader::new(file);
    for request in reader.requests() {
        let submitted = match request {
            Ok(request) => request.submit(&registry).await,
            Err(e) => {
                eprintln!("Error reading request: {}", e);
                continue;
            }
        };
        if let Err(e) = submitted {
            eprintln!("Error submitting request: {}", e);
        }
    }

    // Buffered work is not drained on exit; give the workers time to tick
    let linger = cli
        .linger_ms
        .map(Duration::from_millis)
        .unwrap_or(config.tick_interval() * 2);
    info!(linger_ms = linger.as_millis() as u64, "Intake complete");
    tokio::time::sleep(linger).await;

    Ok(())
}
