use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use loanrecon_core::{LoanPaymentRecord, Money, YearMonth};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::source::LoanRecordSource;
use crate::util::{parse_date, start_line};

/// Column names in the loan tape extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanTapeProfile {
    pub id_column: String,
    pub date_column: String,
    pub amount_column: String,
    pub date_format: String,
}

impl Default for LoanTapeProfile {
    fn default() -> Self {
        Self {
            id_column: "loan_id".to_string(),
            date_column: "actual_company_payment_date".to_string(),
            amount_column: "company_payment_amount".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Parses a headed loan tape CSV, keeping payments made after `since`.
/// Loans without a payment date have not been paid and are skipped.
pub fn parse_loan_tape<R: Read>(
    origin: &str,
    mut data: R,
    profile: &LoanTapeProfile,
    since: YearMonth,
) -> Result<Vec<LoanPaymentRecord>, SourceError> {
    let mut bytes = Vec::new();
    data.read_to_end(&mut bytes)
        .map_err(|e| SourceError::unavailable(origin, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes.as_slice());

    let headers = reader.headers().map_err(|e| SourceError::csv(origin, e))?.clone();
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let missing = |name: &str| SourceError::MissingColumn {
        origin: origin.to_string(),
        column: name.to_string(),
    };
    let date_col = find(&profile.date_column).ok_or_else(|| missing(&profile.date_column))?;
    let amount_col = find(&profile.amount_column).ok_or_else(|| missing(&profile.amount_column))?;
    let id_col = find(&profile.id_column);

    let mut records = Vec::new();
    let mut before_cutoff = 0usize;
    let mut unpaid = 0usize;
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| SourceError::csv(origin, e))?;
        // Header is line 1.
        let line = record.position().map_or(idx + 2, |pos| start_line(&bytes, pos));

        let date_cell = record.get(date_col).unwrap_or_default();
        if date_cell.is_empty() {
            unpaid += 1;
            continue;
        }
        let date = parse_date(date_cell, &profile.date_format).ok_or_else(|| SourceError::InvalidDate {
            origin: origin.to_string(),
            row: line,
            value: date_cell.to_string(),
        })?;
        if YearMonth::of(date) <= since {
            before_cutoff += 1;
            continue;
        }

        let amount_cell = record.get(amount_col).unwrap_or_default();
        let amount = amount_cell.parse::<Money>().map_err(|_| SourceError::InvalidAmount {
            origin: origin.to_string(),
            row: line,
            value: amount_cell.to_string(),
        })?;

        let loan_id = id_col
            .and_then(|c| record.get(c))
            .map(str::to_string)
            .unwrap_or_else(|| format!("line-{line}"));
        records.push(LoanPaymentRecord {
            loan_id,
            actual_company_payment_date: date,
            amount,
        });
    }

    if unpaid > 0 {
        warn!(origin, unpaid, "skipped loan tape rows without a payment date");
    }
    debug!(origin, before_cutoff, %since, "dropped loan payments at or before cutoff");
    Ok(records)
}

#[derive(Debug, Clone)]
pub struct CsvLoanTapeSource {
    path: PathBuf,
    profile: LoanTapeProfile,
}

impl CsvLoanTapeSource {
    pub fn new(path: impl Into<PathBuf>, profile: LoanTapeProfile) -> Self {
        Self {
            path: path.into(),
            profile,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LoanRecordSource for CsvLoanTapeSource {
    fn fetch_loan_records(&self, since: YearMonth) -> Result<Vec<LoanPaymentRecord>, SourceError> {
        let origin = self.path.display().to_string();
        let file = File::open(&self.path).map_err(|e| SourceError::unavailable(&origin, e))?;
        let records = parse_loan_tape(&origin, file, &self.profile, since)?;
        info!(records = records.len(), %since, path = %origin, "loaded loan tape");
        Ok(records)
    }
}
