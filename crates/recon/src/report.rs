use std::io::Write;
use std::str::FromStr;

use loanrecon_core::{BankAccount, Money, YearMonth};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const COLUMNS: [&str; 7] = [
    "year",
    "month",
    "bank",
    "bank_statement_total",
    "loan_tape_total",
    "variance",
    "variance_percent",
];

/// One bank's totals for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummaryRow {
    pub year: i32,
    pub month: u32,
    pub bank: BankAccount,
    pub bank_statement_total: Money,
    pub loan_tape_total: Money,
    /// `loan_tape_total - bank_statement_total`.
    pub variance: Money,
    /// `None` when the bank statement total is zero.
    pub variance_percent: Option<Decimal>,
}

impl ReconciliationSummaryRow {
    /// `None` if the variance is not representable.
    pub fn new(
        period: YearMonth,
        bank: BankAccount,
        bank_statement_total: Money,
        loan_tape_total: Money,
    ) -> Option<Self> {
        let variance = loan_tape_total.checked_sub(bank_statement_total)?;
        Some(ReconciliationSummaryRow {
            year: period.year(),
            month: period.month(),
            bank,
            bank_statement_total,
            loan_tape_total,
            variance,
            variance_percent: variance.percent_of(bank_statement_total),
        })
    }

    fn to_record(&self) -> ReportRecord {
        ReportRecord {
            year: self.year,
            month: self.month,
            bank: self.bank.name(),
            bank_statement_total: self.bank_statement_total.to_string(),
            loan_tape_total: self.loan_tape_total.to_string(),
            variance: self.variance.to_string(),
            variance_percent: self.variance_percent.map(|p| format!("{p:.2}")),
        }
    }
}

/// Flattened, display-formatted row shared by the CSV and JSON writers.
#[derive(Serialize)]
struct ReportRecord {
    year: i32,
    month: u32,
    bank: &'static str,
    bank_statement_total: String,
    loan_tape_total: String,
    variance: String,
    variance_percent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ReportFormat::Table),
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("Unknown report format: '{other}'")),
        }
    }
}

pub fn write_report<W: Write>(
    out: W,
    rows: &[ReconciliationSummaryRow],
    format: ReportFormat,
) -> std::io::Result<()> {
    match format {
        ReportFormat::Table => write_table(out, rows),
        ReportFormat::Csv => write_csv(out, rows),
        ReportFormat::Json => write_json(out, rows),
    }
}

/// Fixed-width text table; undefined percentages print as `NaN`.
pub fn write_table<W: Write>(mut out: W, rows: &[ReconciliationSummaryRow]) -> std::io::Result<()> {
    let cells: Vec<[String; 7]> = rows
        .iter()
        .map(|row| {
            [
                row.year.to_string(),
                row.month.to_string(),
                row.bank.to_string(),
                row.bank_statement_total.to_string(),
                row.loan_tape_total.to_string(),
                row.variance.to_string(),
                row.variance_percent
                    .map(|p| format!("{p:.2}"))
                    .unwrap_or_else(|| "NaN".to_string()),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(str::len);
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.len());
        }
    }

    // Bank name left-aligned, everything else right-aligned.
    let render = |line: [&str; 7]| -> String {
        line.iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                if i == 2 {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    writeln!(out, "{}", render(COLUMNS))?;
    for line in &cells {
        writeln!(out, "{}", render(line.each_ref().map(String::as_str)))?;
    }
    Ok(())
}

pub fn write_csv<W: Write>(out: W, rows: &[ReconciliationSummaryRow]) -> std::io::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    if rows.is_empty() {
        writer.write_record(COLUMNS).map_err(std::io::Error::from)?;
    }
    for row in rows {
        writer.serialize(row.to_record()).map_err(std::io::Error::from)?;
    }
    writer.flush()
}

pub fn write_json<W: Write>(mut out: W, rows: &[ReconciliationSummaryRow]) -> std::io::Result<()> {
    let records: Vec<ReportRecord> = rows.iter().map(ReconciliationSummaryRow::to_record).collect();
    serde_json::to_writer_pretty(&mut out, &records)?;
    writeln!(out)
}
