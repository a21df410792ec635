pub mod error;
pub mod loan_tape;
pub mod source;
pub mod statement;
pub mod table;
pub(crate) mod util;

pub use error::SourceError;
pub use loan_tape::{CsvLoanTapeSource, LoanTapeProfile};
pub use source::{LoanRecordSource, StatementSource};
pub use statement::{CsvStatementSource, StatementProfile};
pub use table::{clean_raw_table, CleanRow, CleanTable};
