use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use loanrecon_core::{BankAccount, YearMonth, RETENTION_CUTOFF};
use loanrecon_import::{CsvLoanTapeSource, CsvStatementSource, LoanTapeProfile, StatementProfile};
use loanrecon_recon::ReportFormat;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "loanrecon.toml";

/// Statement preambles are a handful of rows; anything past this is a typo.
pub const MAX_HEADER_ROW: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub statements: StatementsConfig,
    pub loan_tape: LoanTapeConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementsConfig {
    /// Directory holding one `<worksheet>.csv` export per bank.
    pub dir: PathBuf,
    /// Keyed by bank name or worksheet name (`BDO`, `UB`, ...).
    pub banks: BTreeMap<String, BankOverride>,
}

impl Default for StatementsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("sample_data/statements"),
            banks: BTreeMap::new(),
        }
    }
}

/// Per-bank layout overrides; unset fields keep the bank's defaults. An empty
/// `description_column` means the sheet has none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankOverride {
    pub worksheet: Option<String>,
    pub header_row: Option<usize>,
    pub date_column: Option<String>,
    pub description_column: Option<String>,
    pub credit_column: Option<String>,
    pub date_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanTapeConfig {
    pub path: PathBuf,
    /// Payments in or before this month are ignored.
    pub cutoff: YearMonth,
    #[serde(flatten)]
    pub columns: LoanTapeProfile,
}

impl Default for LoanTapeConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sample_data/anonymized_loan_tapes.csv"),
            cutoff: RETENTION_CUTOFF,
            columns: LoanTapeProfile::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub banks: Vec<BankAccount>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Table,
            banks: BankAccount::ALL.to_vec(),
        }
    }
}

impl Config {
    pub fn from_toml(input: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(input).context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `explicit` if given (it must exist), otherwise the per-user
    /// config file if present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    tracing::debug!("no config file found, using defaults");
                    return Ok(Config::default());
                }
            },
        };

        let input = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml(&input).with_context(|| format!("loading config {}", path.display()))?;
        tracing::info!("Loaded config: {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.report.banks.is_empty() {
            bail!("report.banks must name at least one bank");
        }
        for (key, o) in &self.statements.banks {
            let bank = key
                .parse::<BankAccount>()
                .map_err(|e| anyhow::anyhow!("statements.banks: {e}"))?;
            let fields = [
                ("worksheet", &o.worksheet),
                ("date_column", &o.date_column),
                ("credit_column", &o.credit_column),
                ("date_format", &o.date_format),
            ];
            for (name, value) in fields {
                if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                    bail!("statements.banks.{bank}.{name} must not be empty");
                }
            }
            if o.header_row.is_some_and(|row| row > MAX_HEADER_ROW) {
                bail!("statements.banks.{bank}.header_row must be at most {MAX_HEADER_ROW}");
            }
            let profile = self.statement_profile(bank);
            if profile.date_column.trim().eq_ignore_ascii_case(profile.credit_column.trim()) {
                bail!(
                    "statements.banks.{bank}: date_column and credit_column both name '{}'",
                    profile.credit_column
                );
            }
        }
        let lt = &self.loan_tape.columns;
        if lt.date_column.trim().is_empty() || lt.amount_column.trim().is_empty() {
            bail!("loan_tape date_column and amount_column must not be empty");
        }
        Ok(())
    }

    pub fn statement_profile(&self, bank: BankAccount) -> StatementProfile {
        let base = StatementProfile::for_bank(bank);
        let Some(o) = self.bank_override(bank) else {
            return base;
        };
        StatementProfile {
            worksheet: o.worksheet.clone().unwrap_or(base.worksheet),
            header_row: o.header_row.unwrap_or(base.header_row),
            date_column: o.date_column.clone().unwrap_or(base.date_column),
            description_column: match o.description_column.as_deref().map(str::trim) {
                Some("") => None,
                Some(name) => Some(name.to_string()),
                None => base.description_column,
            },
            credit_column: o.credit_column.clone().unwrap_or(base.credit_column),
            date_format: o.date_format.clone().unwrap_or(base.date_format),
        }
    }

    fn bank_override(&self, bank: BankAccount) -> Option<&BankOverride> {
        self.statements
            .banks
            .iter()
            .find(|(key, _)| key.parse::<BankAccount>() == Ok(bank))
            .map(|(_, o)| o)
    }

    pub fn statement_source(&self) -> CsvStatementSource {
        BankAccount::ALL
            .into_iter()
            .fold(CsvStatementSource::new(&self.statements.dir), |source, bank| {
                source.with_profile(bank, self.statement_profile(bank))
            })
    }

    pub fn loan_tape_source(&self) -> CsvLoanTapeSource {
        CsvLoanTapeSource::new(&self.loan_tape.path, self.loan_tape.columns.clone())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "loanrecon", "loanrecon")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
