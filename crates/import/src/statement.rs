use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use loanrecon_core::{BankAccount, BankTable, BankTransactionRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::source::StatementSource;
use crate::table::{clean_raw_table, CleanTable};
use crate::util::{parse_date, start_line};

/// Layout of one bank's worksheet export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementProfile {
    pub worksheet: String,
    pub header_row: usize,
    pub date_column: String,
    pub description_column: Option<String>,
    pub credit_column: String,
    pub date_format: String,
}

impl StatementProfile {
    pub fn for_bank(bank: BankAccount) -> Self {
        Self {
            worksheet: bank.worksheet().to_string(),
            header_row: bank.header_row(),
            date_column: "Date".to_string(),
            description_column: Some("Description".to_string()),
            credit_column: bank.credit_column().to_string(),
            date_format: "%m/%d/%Y".to_string(),
        }
    }
}

/// Reads every row of a headerless CSV export as raw strings. Row `i` is the
/// record starting on line `i + 1`: the CSV reader skips empty lines, so they
/// are put back as empty rows to keep header offsets and line numbers true to
/// the sheet.
pub fn read_raw_rows<R: Read>(origin: &str, mut data: R) -> Result<Vec<Vec<String>>, SourceError> {
    let mut bytes = Vec::new();
    data.read_to_end(&mut bytes)
        .map_err(|e| SourceError::unavailable(origin, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| SourceError::csv(origin, e))?;
        let line = record
            .position()
            .map_or(rows.len() + 1, |pos| start_line(&bytes, pos));
        while rows.len() + 1 < line {
            rows.push(Vec::new());
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Converts a cleaned worksheet into statement records. Rows without a date
/// (balance forward, page totals) are skipped; the credit cell is carried
/// through unparsed.
pub fn extract_bank_table(
    bank: BankAccount,
    table: &CleanTable,
    profile: &StatementProfile,
) -> Result<BankTable, SourceError> {
    let date_col = table.column(&profile.date_column)?;
    let credit_col = table.column(&profile.credit_column)?;
    // Descriptions are informational; a sheet without one still reconciles.
    let description_col = profile.description_column.as_deref().and_then(|name| {
        let col = table.find_column(name);
        if col.is_none() {
            debug!(%bank, column = name, "no description column");
        }
        col
    });

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let date_cell = row.get(date_col).trim();
        if date_cell.is_empty() {
            warn!(%bank, line = row.line, origin = %table.origin, "skipping row without a date");
            continue;
        }
        let date = parse_date(date_cell, &profile.date_format).ok_or_else(|| SourceError::InvalidDate {
            origin: table.origin.clone(),
            row: row.line,
            value: date_cell.to_string(),
        })?;
        let description = description_col.map(|c| row.get(c).trim()).unwrap_or_default();
        records.push(BankTransactionRecord::new(date, description, row.get(credit_col)).at_line(row.line));
    }

    Ok(BankTable::new(bank, records).with_credit_column(&profile.credit_column))
}

/// Statement source backed by per-worksheet CSV exports of the bank
/// transaction history workbook, named `<worksheet>.csv`.
#[derive(Debug, Clone)]
pub struct CsvStatementSource {
    dir: PathBuf,
    profiles: BTreeMap<BankAccount, StatementProfile>,
}

impl CsvStatementSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            profiles: BTreeMap::new(),
        }
    }

    pub fn with_profile(mut self, bank: BankAccount, profile: StatementProfile) -> Self {
        self.profiles.insert(bank, profile);
        self
    }

    pub fn profile(&self, bank: BankAccount) -> StatementProfile {
        self.profiles
            .get(&bank)
            .cloned()
            .unwrap_or_else(|| StatementProfile::for_bank(bank))
    }

    pub fn path_for(&self, profile: &StatementProfile) -> PathBuf {
        self.dir.join(format!("{}.csv", profile.worksheet))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StatementSource for CsvStatementSource {
    fn fetch_bank_table(&self, bank: BankAccount) -> Result<BankTable, SourceError> {
        let profile = self.profile(bank);
        let path = self.path_for(&profile);
        let origin = path.display().to_string();

        let file = File::open(&path).map_err(|e| SourceError::unavailable(&origin, e))?;
        let raw = read_raw_rows(&origin, file)?;
        let cleaned = clean_raw_table(&origin, raw, profile.header_row)?;
        let table = extract_bank_table(bank, &cleaned, &profile)?;

        info!(%bank, records = table.records.len(), path = %origin, "loaded bank statement");
        Ok(table)
    }
}
