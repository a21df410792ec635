use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::bank::BankAccount;
use super::money::Money;

/// One statement line. The credit cell is kept as exported so that a bad
/// value can be reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransactionRecord {
    pub date: NaiveDate,
    pub description: String,
    pub credit: String,
    /// 1-based line in the source sheet, when the record came from one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl BankTransactionRecord {
    pub fn new(date: NaiveDate, description: &str, credit: &str) -> Self {
        BankTransactionRecord {
            date,
            description: description.to_string(),
            credit: credit.to_string(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// Cleaned statement for a single bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTable {
    pub account: BankAccount,
    pub credit_column: String,
    pub records: Vec<BankTransactionRecord>,
}

impl BankTable {
    pub fn new(account: BankAccount, records: Vec<BankTransactionRecord>) -> Self {
        BankTable {
            account,
            credit_column: account.credit_column().to_string(),
            records,
        }
    }

    pub fn with_credit_column(mut self, column: &str) -> Self {
        self.credit_column = column.to_string();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPaymentRecord {
    pub loan_id: String,
    pub actual_company_payment_date: NaiveDate,
    pub amount: Money,
}

impl LoanPaymentRecord {
    pub fn new(loan_id: &str, actual_company_payment_date: NaiveDate, amount: Money) -> Self {
        LoanPaymentRecord {
            loan_id: loan_id.to_string(),
            actual_company_payment_date,
            amount,
        }
    }
}
