use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use loanrecon_core::{BankAccount, BankTable, LoanPaymentRecord, MonthRange, YearMonth};
use loanrecon_import::{LoanRecordSource, StatementSource};
use loanrecon_recon::report::write_report;
use loanrecon_recon::{ReconciliationSummaryRow, Reconciler, ReportFormat};
use tokio::task::JoinSet;

use crate::config::Config;

/// Fetches every requested bank table and the loan tape in parallel.
pub async fn fetch_inputs(
    statements: Arc<dyn StatementSource>,
    loan_tape: Arc<dyn LoanRecordSource>,
    banks: &[BankAccount],
    cutoff: YearMonth,
) -> anyhow::Result<(BTreeMap<BankAccount, BankTable>, Vec<LoanPaymentRecord>)> {
    let mut fetches = JoinSet::new();
    for &bank in banks {
        let source = Arc::clone(&statements);
        fetches.spawn_blocking(move || (bank, source.fetch_bank_table(bank)));
    }
    let loan_fetch = tokio::task::spawn_blocking(move || loan_tape.fetch_loan_records(cutoff));

    let mut tables = BTreeMap::new();
    while let Some(joined) = fetches.join_next().await {
        let (bank, result) = joined.context("statement fetch task failed")?;
        let table = result.with_context(|| format!("fetching {bank} statement"))?;
        tables.insert(bank, table);
    }

    let loans = loan_fetch
        .await
        .context("loan tape fetch task failed")?
        .context("fetching loan tape")?;
    Ok((tables, loans))
}

/// Fetches, reconciles and renders. Nothing is written unless every month
/// reconciles cleanly.
pub async fn reconcile_to<W: Write>(
    config: &Config,
    range: MonthRange,
    banks: &[BankAccount],
    format: ReportFormat,
    out: W,
) -> anyhow::Result<Vec<ReconciliationSummaryRow>> {
    let reconciler = Reconciler::new(banks.to_vec());
    let statements: Arc<dyn StatementSource> = Arc::new(config.statement_source());
    let loan_tape: Arc<dyn LoanRecordSource> = Arc::new(config.loan_tape_source());

    let (tables, loans) = fetch_inputs(statements, loan_tape, reconciler.banks(), config.loan_tape.cutoff).await?;
    let rows = reconciler
        .run_range(&tables, &loans, range)
        .with_context(|| format!("reconciling {range}"))?;

    write_report(out, &rows, format).context("writing report")?;
    Ok(rows)
}

pub async fn run(
    config: &Config,
    range: MonthRange,
    banks: &[BankAccount],
    format: ReportFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut buf = Vec::new();
    let rows = reconcile_to(config, range, banks, format, &mut buf).await?;
    match output {
        Some(path) => {
            std::fs::write(path, buf).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => std::io::stdout()
            .lock()
            .write_all(&buf)
            .context("writing report to stdout")?,
    }

    let unreconciled = rows.iter().filter(|r| !r.variance.is_zero()).count();
    tracing::info!(rows = rows.len(), unreconciled, "reconciliation finished for {range}");
    Ok(())
}

pub fn show_config(config: &Config) -> anyhow::Result<()> {
    let text = toml::to_string_pretty(config).context("serializing config")?;
    print!("{text}");
    Ok(())
}
