use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The bank accounts whose statements are reconciled against the loan tape.
///
/// Declaration order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BankAccount {
    #[serde(rename = "Unionbank", alias = "UB")]
    Unionbank,
    #[serde(rename = "BDO")]
    Bdo,
    #[serde(rename = "BPI")]
    Bpi,
    #[serde(rename = "Netbank")]
    Netbank,
}

impl BankAccount {
    pub const ALL: [BankAccount; 4] = [
        BankAccount::Unionbank,
        BankAccount::Bdo,
        BankAccount::Bpi,
        BankAccount::Netbank,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BankAccount::Unionbank => "Unionbank",
            BankAccount::Bdo => "BDO",
            BankAccount::Bpi => "BPI",
            BankAccount::Netbank => "Netbank",
        }
    }

    /// Tab name in the bank transaction history workbook.
    pub fn worksheet(self) -> &'static str {
        match self {
            BankAccount::Unionbank => "UB",
            BankAccount::Bdo => "BDO",
            BankAccount::Bpi => "BPI",
            BankAccount::Netbank => "Netbank",
        }
    }

    /// Rows of preamble (account details, statement period) above the header.
    pub fn header_row(self) -> usize {
        match self {
            BankAccount::Bdo | BankAccount::Bpi => 5,
            BankAccount::Unionbank | BankAccount::Netbank => 4,
        }
    }

    pub fn credit_column(self) -> &'static str {
        "Credit"
    }
}

impl fmt::Display for BankAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BankAccount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        BankAccount::ALL
            .into_iter()
            .find(|bank| bank.name().eq_ignore_ascii_case(s) || bank.worksheet().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown bank: '{s}'"))
    }
}
