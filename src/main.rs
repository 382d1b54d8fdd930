use std::io::{stderr, stdout, BufWriter, Write};
use std::path::PathBuf;
use std::process::exit;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{info, warn};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};
use uuid::Uuid;

use transaction_ingest_engine::types::{Currency, DateRange, TaskId};
use transaction_ingest_engine::{
    DispatchError, EngineConfig, FileTaskRegistry, IngestionDispatcher, IngestionEngine, IngestionSource, LeaderboardQuery, Limit,
    MemoryTaskRegistry, QueryError, ReportEngine, TaskRegistry, TaskStatus, TaskStatusView, TransactionStorage
};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Parser)]
#[command(name = "transaction-ingest-engine")]
#[command(about = "Ingests transaction CSV files and reports on the stored data", long_about = None)]
struct Cli {
    /// One of error, warn, info, debug, trace. Logs go to stderr.
    #[arg(long, default_value = "error", global = true)]
    log_level: String,

    /// Keep task state as JSON files in this directory instead of in memory.
    #[arg(long, global = true)]
    registry_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 4, global = true)]
    workers: usize,

    #[arg(long, default_value_t = 64, global = true)]
    queue_capacity: usize,

    /// Seconds to wait for a task before reporting it as stalled.
    #[arg(long, default_value_t = 300, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest each file as its own task and print the final task status.
    Ingest {
        #[arg(required = true)]
        files: Vec<PathBuf>
    },

    /// Print the status of a task kept in `--registry-dir`.
    Status {
        task_id: String
    },

    /// Ingest the inputs, then print one report over them.
    Report {
        /// CSV file to load before reporting. Repeat for several files.
        #[arg(long = "input", required = true)]
        inputs: Vec<PathBuf>,

        #[command(subcommand)]
        kind: ReportKind
    }
}

#[derive(Subcommand)]
enum ReportKind {
    CustomerSummary {
        customer_id: Uuid,
        #[command(flatten)]
        window: Window
    },
    ProductSummary {
        product_id: Uuid,
        #[command(flatten)]
        window: Window
    },
    TopCustomers {
        #[command(flatten)]
        ranking: Ranking
    },
    TopProducts {
        #[command(flatten)]
        ranking: Ranking
    }
}

#[derive(Args)]
struct Window {
    /// Inclusive lower bound, YYYY-MM-DD.
    #[arg(long)]
    start_date: Option<String>,

    /// Inclusive upper bound, YYYY-MM-DD.
    #[arg(long)]
    end_date: Option<String>
}

#[derive(Args)]
struct Ranking {
    #[command(flatten)]
    window: Window,

    #[arg(long)]
    limit: Option<String>,

    #[arg(long)]
    currency: Option<String>
}

/// Report parameters after validation; nothing is ingested until these parse.
enum ReportRequest {
    CustomerSummary(Uuid, DateRange),
    ProductSummary(Uuid, DateRange),
    TopCustomers(LeaderboardQuery),
    TopProducts(LeaderboardQuery)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(parse_log_level(&cli.log_level));

    let config = EngineConfig::default()
        .with_workers(cli.workers)
        .with_queue_capacity(cli.queue_capacity);
    let timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Commands::Ingest { files } => {
            let statuses = match &cli.registry_dir {
                Some(directory) => {
                    let registry = FileTaskRegistry::open(directory).await?
                        .with_cache(config.cache_capacity, config.cache_timeout);
                    ingest_files(Arc::new(registry), Arc::new(TransactionStorage::new()), &config, files, timeout).await?
                }
                None => ingest_files(Arc::new(MemoryTaskRegistry::new()), Arc::new(TransactionStorage::new()), &config, files, timeout).await?
            };

            let any_failed = statuses.iter().any(|status| status.status != TaskStatus::Success);

            for status in &statuses {
                write_json_to_stdout(status)?;
            }

            if any_failed {
                exit(1);
            }
        }
        Commands::Status { task_id } => {
            let directory = cli.registry_dir
                .ok_or_else(|| anyhow!("The status command needs --registry-dir to locate task state"))?;
            let task_id = TaskId::from_str(&task_id)
                .map_err(|error| anyhow!("Invalid task id '{task_id}': {error}"))?;

            let registry = FileTaskRegistry::open(directory).await?;
            let record = registry.get(task_id).await?;

            write_json_to_stdout(&record.status_view())?;
        }
        Commands::Report { inputs, kind } => {
            let request = parse_report_request(kind)?;
            let storage = Arc::new(TransactionStorage::new());

            let statuses = ingest_files(Arc::new(MemoryTaskRegistry::new()), storage.clone(), &config, inputs, timeout).await?;

            for status in statuses.iter().filter(|status| status.status != TaskStatus::Success) {
                warn!("Task [{}] ended {} and contributes no report rows: {}", status.task_id, status.status, status.error.as_deref().unwrap_or_default());
            }

            let reports = ReportEngine::new(storage);

            match request {
                ReportRequest::CustomerSummary(customer_id, range) => write_json_to_stdout(&reports.customer_summary(customer_id, &range)?)?,
                ReportRequest::ProductSummary(product_id, range) => write_json_to_stdout(&reports.product_summary(product_id, &range)?)?,
                ReportRequest::TopCustomers(query) => write_json_to_stdout(&reports.top_customers(&query)?)?,
                ReportRequest::TopProducts(query) => write_json_to_stdout(&reports.top_products(&query)?)?
            }
        }
    }

    Ok(())
}

async fn ingest_files<R: TaskRegistry>(
    registry: Arc<R>,
    storage: Arc<TransactionStorage>,
    config: &EngineConfig,
    files: Vec<PathBuf>,
    timeout: Duration
) -> Result<Vec<TaskStatusView>> {
    let engine = IngestionEngine::new(storage, registry)
        .with_backpressure(config.backpressure)
        .with_progress_interval(config.progress_interval);
    let dispatcher = IngestionDispatcher::start(Arc::new(engine), config);

    let timer = Instant::now();
    let statuses = collect_statuses(&dispatcher, files, timeout).await;

    //NOTE: A stalled task would keep its worker busy forever, so the drain is bounded too.
    if tokio::time::timeout(timeout, dispatcher.shutdown()).await.is_err() {
        warn!("Ingestion workers were still busy after {timeout:?}, exiting without them");
    }

    let statuses = statuses?;
    info!("Processed {} files in: {:?}", statuses.len(), timer.elapsed());

    Ok(statuses)
}

async fn collect_statuses<R: TaskRegistry>(
    dispatcher: &IngestionDispatcher<R>,
    files: Vec<PathBuf>,
    timeout: Duration
) -> Result<Vec<TaskStatusView>> {
    let mut task_ids = Vec::with_capacity(files.len());

    for file in files {
        let source = IngestionSource::File(file);

        loop {
            match dispatcher.submit(source.clone()).await {
                Ok(submission) => {
                    task_ids.push(submission.task_id);
                    break;
                }
                Err(DispatchError::QueueFull) => sleep(POLL_INTERVAL).await,
                Err(error) => return Err(error.into())
            }
        }
    }

    let outcomes = dispatcher.wait_for_all(&task_ids, POLL_INTERVAL, timeout).await;
    let mut statuses = Vec::with_capacity(task_ids.len());

    for (task_id, outcome) in task_ids.into_iter().zip(outcomes) {
        match outcome {
            Ok(record) => statuses.push(record.status_view()),
            Err(DispatchError::Timeout { status, .. }) => {
                warn!("Task [{task_id}] is still {status} after {timeout:?}");
                statuses.push(dispatcher.status(task_id).await?);
            }
            Err(error) => return Err(error.into())
        }
    }

    Ok(statuses)
}

fn parse_report_request(kind: ReportKind) -> Result<ReportRequest, QueryError> {
    let request = match kind {
        ReportKind::CustomerSummary { customer_id, window } => ReportRequest::CustomerSummary(customer_id, parse_window(&window)?),
        ReportKind::ProductSummary { product_id, window } => ReportRequest::ProductSummary(product_id, parse_window(&window)?),
        ReportKind::TopCustomers { ranking } => ReportRequest::TopCustomers(parse_ranking(&ranking)?),
        ReportKind::TopProducts { ranking } => ReportRequest::TopProducts(parse_ranking(&ranking)?)
    };

    Ok(request)
}

fn parse_window(window: &Window) -> Result<DateRange, QueryError> {
    Ok(DateRange::parse(window.start_date.as_deref(), window.end_date.as_deref())?)
}

fn parse_ranking(ranking: &Ranking) -> Result<LeaderboardQuery, QueryError> {
    let mut query = LeaderboardQuery::default().within(parse_window(&ranking.window)?);

    if let Some(limit) = &ranking.limit {
        query = query.with_limit(Limit::from_str(limit)?);
    }

    if let Some(currency) = &ranking.currency {
        query = query.in_currency(Currency::from_str(currency)?);
    }

    Ok(query)
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the JSON output, so logging goes to stderr.
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn write_json_to_stdout<T: Serialize>(value: &T) -> Result<()> {
    let mut output = BufWriter::new(stdout().lock());

    serde_json::to_writer_pretty(&mut output, value)?;
    writeln!(output)?;
    output.flush()?;

    Ok(())
}
