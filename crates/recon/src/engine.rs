use std::collections::BTreeMap;

use loanrecon_core::{
    parse_credit, BankAccount, BankTable, LoanPaymentRecord, Money, MonthRange, YearMonth,
};
use tracing::{debug, info};

use crate::error::ReconError;
use crate::report::ReconciliationSummaryRow;

/// Reconciles a fixed set of banks. Output rows follow `BankAccount`
/// declaration order regardless of the order banks were configured in.
#[derive(Debug, Clone)]
pub struct Reconciler {
    banks: Vec<BankAccount>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(BankAccount::ALL.to_vec())
    }
}

impl Reconciler {
    pub fn new(mut banks: Vec<BankAccount>) -> Self {
        banks.sort();
        banks.dedup();
        Self { banks }
    }

    pub fn banks(&self) -> &[BankAccount] {
        &self.banks
    }

    pub fn run(
        &self,
        bank_tables: &BTreeMap<BankAccount, BankTable>,
        loans: &[LoanPaymentRecord],
        period: YearMonth,
    ) -> Result<Vec<ReconciliationSummaryRow>, ReconError> {
        info!(%period, banks = self.banks.len(), loans = loans.len(), "reconciling");

        // Every requested table is present and fully parseable before any row
        // is produced.
        let parsed = self
            .banks
            .iter()
            .map(|&bank| {
                let table = bank_tables.get(&bank).ok_or(ReconError::MissingSource(bank))?;
                parse_table(bank, table).map(|credits| (bank, credits))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let loan_tape_total = loan_total(loans, period).ok_or_else(|| ReconError::Overflow {
            what: "loan tape total".to_string(),
            period,
        })?;
        debug!(%period, %loan_tape_total, "loan tape total");

        parsed
            .into_iter()
            .map(|(bank, credits)| {
                let in_month = credits
                    .iter()
                    .filter(|(date, _)| period.contains(*date))
                    .map(|(_, amount)| *amount);
                let bank_statement_total = Money::checked_sum(in_month).ok_or_else(|| ReconError::Overflow {
                    what: format!("{bank} statement total"),
                    period,
                })?;
                debug!(%period, %bank, %bank_statement_total, "bank statement total");
                ReconciliationSummaryRow::new(period, bank, bank_statement_total, loan_tape_total).ok_or_else(|| {
                    ReconError::Overflow {
                        what: format!("{bank} variance"),
                        period,
                    }
                })
            })
            .collect()
    }

    /// Runs every month of `range`, oldest first.
    pub fn run_range(
        &self,
        bank_tables: &BTreeMap<BankAccount, BankTable>,
        loans: &[LoanPaymentRecord],
        range: MonthRange,
    ) -> Result<Vec<ReconciliationSummaryRow>, ReconError> {
        let mut rows = Vec::with_capacity(self.banks.len());
        for period in range.iter() {
            rows.extend(self.run(bank_tables, loans, period)?);
        }
        Ok(rows)
    }
}

/// Reconciles `banks` for one month. See [`Reconciler::run`].
pub fn reconcile(
    bank_tables: &BTreeMap<BankAccount, BankTable>,
    loans: &[LoanPaymentRecord],
    period: YearMonth,
    banks: &[BankAccount],
) -> Result<Vec<ReconciliationSummaryRow>, ReconError> {
    Reconciler::new(banks.to_vec()).run(bank_tables, loans, period)
}

/// Reconciles every bank that has a table.
pub fn reconcile_all(
    bank_tables: &BTreeMap<BankAccount, BankTable>,
    loans: &[LoanPaymentRecord],
    period: YearMonth,
) -> Result<Vec<ReconciliationSummaryRow>, ReconError> {
    Reconciler::new(bank_tables.keys().copied().collect()).run(bank_tables, loans, period)
}

pub fn reconcile_range(
    bank_tables: &BTreeMap<BankAccount, BankTable>,
    loans: &[LoanPaymentRecord],
    range: MonthRange,
    banks: &[BankAccount],
) -> Result<Vec<ReconciliationSummaryRow>, ReconError> {
    Reconciler::new(banks.to_vec()).run_range(bank_tables, loans, range)
}

fn parse_table(
    bank: BankAccount,
    table: &BankTable,
) -> Result<Vec<(chrono::NaiveDate, Money)>, ReconError> {
    table
        .records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            parse_credit(&record.credit)
                .map(|amount| (record.date, amount))
                .map_err(|_| ReconError::Validation {
                    bank,
                    column: table.credit_column.clone(),
                    row: record.line.unwrap_or(idx + 1),
                    value: record.credit.clone(),
                })
        })
        .collect()
}

fn loan_total(loans: &[LoanPaymentRecord], period: YearMonth) -> Option<Money> {
    Money::checked_sum(
        loans
            .iter()
            .filter(|loan| period.contains(loan.actual_company_payment_date))
            .map(|loan| loan.amount),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use loanrecon_core::BankTransactionRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    fn table(bank: BankAccount, rows: &[(NaiveDate, &str)]) -> BankTable {
        BankTable::new(
            bank,
            rows.iter()
                .map(|(d, credit)| BankTransactionRecord::new(*d, "DEPOSIT", credit))
                .collect(),
        )
    }

    fn loan(d: NaiveDate, cents: i64) -> LoanPaymentRecord {
        LoanPaymentRecord::new("L-1", d, Money::from_cents(cents))
    }

    #[test]
    fn sums_only_target_month() {
        let mut tables = BTreeMap::new();
        tables.insert(
            BankAccount::Bpi,
            table(
                BankAccount::Bpi,
                &[
                    (date(2024, 9, 30), "999.00"),
                    (date(2024, 10, 1), "100.00"),
                    (date(2024, 10, 31), "200.50"),
                    (date(2024, 11, 1), "999.00"),
                ],
            ),
        );
        let loans = vec![loan(date(2024, 10, 15), 30_000), loan(date(2024, 11, 2), 1)];

        let rows = reconcile_all(&tables, &loans, ym(2024, 10)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bank_statement_total, Money::from_cents(30_050));
        assert_eq!(rows[0].loan_tape_total, Money::from_cents(30_000));
        assert_eq!(rows[0].variance, Money::from_cents(-50));
    }

    #[test]
    fn loan_total_is_shared_across_banks() {
        let mut tables = BTreeMap::new();
        tables.insert(BankAccount::Bdo, table(BankAccount::Bdo, &[(date(2024, 10, 2), "5.00")]));
        tables.insert(BankAccount::Netbank, table(BankAccount::Netbank, &[]));
        let loans = vec![loan(date(2024, 10, 3), 700)];

        let rows = reconcile_all(&tables, &loans, ym(2024, 10)).unwrap();
        assert!(rows.iter().all(|r| r.loan_tape_total == Money::from_cents(700)));
    }

    #[test]
    fn rows_follow_enumeration_order() {
        let tables: BTreeMap<_, _> = BankAccount::ALL
            .into_iter()
            .map(|b| (b, table(b, &[])))
            .collect();
        let banks = [BankAccount::Netbank, BankAccount::Bdo, BankAccount::Unionbank, BankAccount::Bpi];

        let rows = reconcile(&tables, &[], ym(2024, 10), &banks).unwrap();
        let order: Vec<BankAccount> = rows.iter().map(|r| r.bank).collect();
        assert_eq!(order, BankAccount::ALL.to_vec());
    }

    #[test]
    fn unparseable_cell_outside_month_still_fails() {
        let mut tables = BTreeMap::new();
        tables.insert(
            BankAccount::Bdo,
            table(BankAccount::Bdo, &[(date(2024, 10, 1), "1.00"), (date(2024, 3, 1), "N/A")]),
        );

        let err = reconcile_all(&tables, &[], ym(2024, 10)).unwrap_err();
        assert_eq!(
            err,
            ReconError::Validation {
                bank: BankAccount::Bdo,
                column: "Credit".to_string(),
                row: 2,
                value: "N/A".to_string(),
            }
        );
    }

    #[test]
    fn validation_names_source_line() {
        let mut tables = BTreeMap::new();
        let records = vec![
            BankTransactionRecord::new(date(2024, 10, 3), "INSTAPAY IN", "500.00").at_line(6),
            BankTransactionRecord::new(date(2024, 10, 5), "INSTAPAY IN", "N/A").at_line(9),
        ];
        tables.insert(BankAccount::Unionbank, BankTable::new(BankAccount::Unionbank, records));

        let err = reconcile_all(&tables, &[], ym(2024, 10)).unwrap_err();
        assert!(matches!(err, ReconError::Validation { row: 9, .. }));
    }

    #[test]
    fn overflowing_total_is_an_error() {
        let max = "79,228,162,514,264,337,593,543,950,335";
        let mut tables = BTreeMap::new();
        tables.insert(
            BankAccount::Bdo,
            table(BankAccount::Bdo, &[(date(2024, 10, 1), max), (date(2024, 10, 2), max)]),
        );

        let err = reconcile_all(&tables, &[], ym(2024, 10)).unwrap_err();
        assert_eq!(
            err,
            ReconError::Overflow {
                what: "BDO statement total".to_string(),
                period: ym(2024, 10),
            }
        );
    }

    #[test]
    fn overflowing_variance_is_an_error() {
        let mut tables = BTreeMap::new();
        tables.insert(
            BankAccount::Bpi,
            table(BankAccount::Bpi, &[(date(2024, 10, 1), "(79,228,162,514,264,337,593,543,950,335)")]),
        );
        let loans = vec![LoanPaymentRecord::new(
            "L-1",
            date(2024, 10, 2),
            "79228162514264337593543950335".parse().unwrap(),
        )];

        let err = reconcile_all(&tables, &loans, ym(2024, 10)).unwrap_err();
        assert!(matches!(err, ReconError::Overflow { ref what, .. } if what == "BPI variance"));
    }

    #[test]
    fn reconciler_dedups_banks() {
        let r = Reconciler::new(vec![BankAccount::Bpi, BankAccount::Bdo, BankAccount::Bpi]);
        assert_eq!(r.banks(), &[BankAccount::Bdo, BankAccount::Bpi]);
        assert_eq!(Reconciler::default().banks(), &BankAccount::ALL);
    }

    #[test]
    fn range_is_month_major() {
        let mut tables = BTreeMap::new();
        tables.insert(
            BankAccount::Unionbank,
            table(BankAccount::Unionbank, &[(date(2024, 11, 5), "10.00"), (date(2024, 12, 5), "20.00")]),
        );
        tables.insert(BankAccount::Bpi, table(BankAccount::Bpi, &[]));
        let range = MonthRange::new(ym(2024, 11), ym(2024, 12)).unwrap();

        let rows =
            reconcile_range(&tables, &[], range, &[BankAccount::Unionbank, BankAccount::Bpi]).unwrap();
        let keys: Vec<(u32, BankAccount)> = rows.iter().map(|r| (r.month, r.bank)).collect();
        assert_eq!(
            keys,
            vec![
                (11, BankAccount::Unionbank),
                (11, BankAccount::Bpi),
                (12, BankAccount::Unionbank),
                (12, BankAccount::Bpi),
            ]
        );
        assert_eq!(rows[2].bank_statement_total, Money::from_cents(2_000));
    }
}
