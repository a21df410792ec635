pub mod bank;
pub mod money;
pub mod period;
pub mod record;

pub use bank::BankAccount;
pub use money::{parse_credit, Money, MoneyParseError};
pub use period::{MonthRange, PeriodError, YearMonth, RETENTION_CUTOFF};
pub use record::{BankTable, BankTransactionRecord, LoanPaymentRecord};
