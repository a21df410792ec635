use loanrecon_core::{BankAccount, YearMonth};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconError {
    #[error("No statement table supplied for {0}")]
    MissingSource(BankAccount),
    /// `row` is the 1-based line of the record in its source sheet, or its
    /// position in the table when the source did not record one.
    #[error("{bank}: column '{column}', row {row}: cannot parse credit amount {value:?}")]
    Validation {
        bank: BankAccount,
        column: String,
        row: usize,
        value: String,
    },
    /// A total or variance for `period` does not fit in a `Decimal`.
    #[error("{what} for {period} overflows")]
    Overflow { what: String, period: YearMonth },
}
