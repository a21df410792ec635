//! Reconciliation engine: pure functions from cleaned bank tables and loan
//! tape records to a per-bank variance report. No source I/O.

pub mod engine;
pub mod error;
pub mod report;

pub use engine::{reconcile, reconcile_all, reconcile_range, Reconciler};
pub use error::ReconError;
pub use report::{ReconciliationSummaryRow, ReportFormat};
