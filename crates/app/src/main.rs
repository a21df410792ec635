use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use loanrecon_core::{BankAccount, MonthRange, YearMonth};
use loanrecon_recon::ReportFormat;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "loanrecon")]
#[command(about = "Reconcile bank statement credits against the loan tape, month by month")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the per-user loanrecon.toml, then built-in defaults)
    #[arg(long, short = 'c', global = true, env = "LOANRECON_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `loanrecon_recon=debug` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a single month
    #[command(after_help = "\
Examples:
  loanrecon run --year 2024 --month 10
  loanrecon run --year 2024 --month 10 --bank BDO --bank BPI -f csv -o oct.csv")]
    Run {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Reconcile every month of an inclusive range
    #[command(after_help = "\
Examples:
  loanrecon range --from 2023-07 --to 2024-10 -f json -o history.json")]
    Range {
        #[arg(long, value_name = "YYYY-MM")]
        from: YearMonth,

        #[arg(long, value_name = "YYYY-MM")]
        to: YearMonth,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}

#[derive(Args)]
struct ReportArgs {
    /// Bank to report (repeatable; defaults to report.banks from config)
    #[arg(long = "bank", value_name = "BANK")]
    banks: Vec<BankAccount>,

    /// Output format: table, csv or json
    #[arg(long, short = 'f')]
    format: Option<ReportFormat>,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Directory of per-bank statement exports
    #[arg(long)]
    statements_dir: Option<PathBuf>,

    /// Loan tape CSV
    #[arg(long)]
    loan_tape: Option<PathBuf>,
}

impl ReportArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.statements_dir {
            config.statements.dir = dir.clone();
        }
        if let Some(path) = &self.loan_tape {
            config.loan_tape.path = path.clone();
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    // Reports go to stdout; keep logs off it.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let mut config = Config::load(cli.config.as_deref())?;

    let (range, report) = match cli.command {
        Commands::Run { year, month, report } => {
            let period = YearMonth::new(year, month).context("invalid --year/--month")?;
            (MonthRange::single(period), report)
        }
        Commands::Range { from, to, report } => {
            (MonthRange::new(from, to).context("invalid --from/--to")?, report)
        }
        Commands::ShowConfig => return commands::show_config(&config),
    };

    report.apply(&mut config);
    let banks = if report.banks.is_empty() {
        config.report.banks.clone()
    } else {
        report.banks.clone()
    };
    let format = report.format.unwrap_or(config.report.format);

    commands::run(&config, range, &banks, format, report.output.as_deref()).await
}
