use loanrecon_core::{BankAccount, BankTable, LoanPaymentRecord, YearMonth};

use crate::error::SourceError;

/// Supplies the cleaned statement table for one bank account.
pub trait StatementSource: Send + Sync {
    fn fetch_bank_table(&self, account: BankAccount) -> Result<BankTable, SourceError>;
}

/// Supplies loan tape records paid strictly after `since`.
pub trait LoanRecordSource: Send + Sync {
    fn fetch_loan_records(&self, since: YearMonth) -> Result<Vec<LoanPaymentRecord>, SourceError>;
}
