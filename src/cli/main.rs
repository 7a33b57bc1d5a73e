use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use lean_flow_metrics::{
    analytics::{run_report, ExportFormat, MetricsAggregator, ReportExporter, ReportWindow},
    config::MetricsConfig,
    sources::{self, LocalJsonSource},
    FlowError,
};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flow-metrics")]
#[command(about = "Lean flow metrics from work item histories", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short, long, env = "FLOW_METRICS_CONFIG", default_value = "flow.toml")]
    config: PathBuf,

    /// First day of the reporting window
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the reporting window; defaults to `until_date` or today
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Window length when `--from` is not given
    #[arg(short, long, default_value = "6")]
    weeks: u32,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every report in the configured plan
    Report {
        /// Output directory for report files
        #[arg(short, long, default_value = "reports")]
        output: PathBuf,

        /// Output format: json or csv
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
    },

    /// Print one work item's details and time in each state
    Detail {
        #[arg(value_name = "WORK_ITEM_ID")]
        id: String,
    },

    /// Print cycle-time statistics for every configured cycle
    Cycles,

    /// Write the loaded work items to a local JSON cache
    Dump {
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_tracing(json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lean_flow_metrics=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match configuration_error(&err) {
                Some(flow) => eprintln!("Configuration error [{}]: {:#}", flow.error_code(), err),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::from(exit_status(&err))
        }
    }
}

fn configuration_error(err: &anyhow::Error) -> Option<&FlowError> {
    err.downcast_ref::<FlowError>()
        .filter(|flow| flow.is_configuration())
}

/// 2 for a configuration problem the user can fix in the config file, 1 otherwise
fn exit_status(err: &anyhow::Error) -> u8 {
    if configuration_error(err).is_some() {
        2
    } else {
        1
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = MetricsConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    config.validate()?;

    let to = cli
        .to
        .or(config.until_date)
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let window = match cli.from {
        Some(from) => ReportWindow::new(from, to)?,
        None => ReportWindow::ending(to, cli.weeks)?,
    };

    tracing::info!(
        "Starting flow-metrics v{} for {} to {}",
        env!("CARGO_PKG_VERSION"),
        window.from,
        window.to
    );

    let raw = sources::open(config.source()?)?.work_items()?;
    let aggregator = MetricsAggregator::build(raw, config.settings()?, Some(to));

    match cli.command {
        Commands::Report { output, format } => {
            let mut written = 0;
            for spec in &config.reports {
                let outputs = run_report(&aggregator, spec, window)
                    .with_context(|| format!("running {} report", spec.metric))?;
                written += ReportExporter::export_all(&outputs, format, &output)?.len();
            }
            println!("Wrote {} report files to {}", written, output.display());
        }

        Commands::Detail { id } => {
            let item = aggregator.work_item(&id)?;
            let body = json!({
                "detail": item.detail(),
                "time_in_states": item.history().time_in_states(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Cycles => {
            let stats = aggregator.cycle_statistics();
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }

        Commands::Dump { output } => {
            LocalJsonSource::save(&output, aggregator.items())?;
            println!(
                "Saved {} work items to {}",
                aggregator.len(),
                output.display()
            );
        }
    }

    Ok(())
}
