use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use loanrecon_core::{BankAccount, BankTable, BankTransactionRecord, LoanPaymentRecord, Money, YearMonth};
use loanrecon_recon::report::write_csv;
use loanrecon_recon::{reconcile, reconcile_all, ReconError};
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn oct_2024() -> YearMonth {
    YearMonth::new(2024, 10).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn table(bank: BankAccount, rows: &[(NaiveDate, &str, &str)]) -> BankTable {
    BankTable::new(
        bank,
        rows.iter()
            .map(|(d, desc, credit)| BankTransactionRecord::new(*d, desc, credit))
            .collect(),
    )
}

/// All four banks with a mix of credits, debits (blank credit) and other months.
fn fixture() -> (BTreeMap<BankAccount, BankTable>, Vec<LoanPaymentRecord>) {
    let mut tables = BTreeMap::new();
    tables.insert(
        BankAccount::Unionbank,
        table(
            BankAccount::Unionbank,
            &[
                (date(2024, 10, 3), "INSTAPAY IN", "₱12,500.00"),
                (date(2024, 10, 4), "SERVICE FEE", ""),
                (date(2024, 9, 28), "INSTAPAY IN", "3,000.00"),
            ],
        ),
    );
    tables.insert(
        BankAccount::Bdo,
        table(
            BankAccount::Bdo,
            &[
                (date(2024, 10, 7), "CASH DEPOSIT", "10,000.00"),
                (date(2024, 10, 8), "WITHDRAWAL", ""),
            ],
        ),
    );
    tables.insert(
        BankAccount::Bpi,
        table(BankAccount::Bpi, &[(date(2024, 11, 1), "FUND TRANSFER", "8,000.00")]),
    );
    tables.insert(BankAccount::Netbank, table(BankAccount::Netbank, &[]));

    let loans = vec![
        LoanPaymentRecord::new("LN-0001", date(2024, 10, 15), Money::from_cents(950_000)),
        LoanPaymentRecord::new("LN-0002", date(2024, 9, 30), Money::from_cents(400_000)),
    ];
    (tables, loans)
}

#[test]
fn bdo_october_scenario() {
    let mut tables = BTreeMap::new();
    tables.insert(
        BankAccount::Bdo,
        table(
            BankAccount::Bdo,
            &[
                (date(2024, 10, 1), "DEPOSIT", "10,000.00"),
                (date(2024, 10, 20), "ATM WITHDRAWAL", ""),
            ],
        ),
    );
    let loans = vec![LoanPaymentRecord::new("LN-1", date(2024, 10, 12), Money::from_decimal(dec("9500")))];

    let rows = reconcile(&tables, &loans, oct_2024(), &[BankAccount::Bdo]).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!((row.year, row.month, row.bank), (2024, 10, BankAccount::Bdo));
    assert_eq!(row.bank_statement_total.as_decimal(), dec("10000.00"));
    assert_eq!(row.loan_tape_total.as_decimal(), dec("9500.00"));
    assert_eq!(row.variance.as_decimal(), dec("-500.00"));
    assert_eq!(row.variance_percent, Some(dec("-5.0")));
}

#[test]
fn variance_is_loan_minus_bank_for_every_row() {
    let (tables, loans) = fixture();
    let rows = reconcile_all(&tables, &loans, oct_2024()).unwrap();
    assert_eq!(rows.len(), 4);
    for row in &rows {
        assert_eq!(row.variance, row.loan_tape_total - row.bank_statement_total);
    }
}

#[test]
fn zero_statement_total_yields_no_percent() {
    let (tables, loans) = fixture();
    let rows = reconcile_all(&tables, &loans, oct_2024()).unwrap();

    // BPI only has a November row, Netbank has no rows at all.
    for bank in [BankAccount::Bpi, BankAccount::Netbank] {
        let row = rows.iter().find(|r| r.bank == bank).unwrap();
        assert_eq!(row.bank_statement_total, Money::zero());
        assert_eq!(row.variance_percent, None);
    }
}

#[test]
fn totals_per_bank() {
    let (tables, loans) = fixture();
    let rows = reconcile_all(&tables, &loans, oct_2024()).unwrap();
    let totals: Vec<(BankAccount, Money)> = rows.iter().map(|r| (r.bank, r.bank_statement_total)).collect();
    assert_eq!(
        totals,
        vec![
            (BankAccount::Unionbank, Money::from_cents(1_250_000)),
            (BankAccount::Bdo, Money::from_cents(1_000_000)),
            (BankAccount::Bpi, Money::zero()),
            (BankAccount::Netbank, Money::zero()),
        ]
    );
}

#[test]
fn rerun_is_byte_identical() {
    let (tables, loans) = fixture();
    let render = || {
        let rows = reconcile_all(&tables, &loans, oct_2024()).unwrap();
        let mut buf = Vec::new();
        write_csv(&mut buf, &rows).unwrap();
        buf
    };
    assert_eq!(render(), render());
}

#[test]
fn inputs_are_not_mutated() {
    let (tables, loans) = fixture();
    let before = (tables.clone(), loans.clone());
    reconcile_all(&tables, &loans, oct_2024()).unwrap();
    assert_eq!((tables, loans), before);
}

#[test]
fn missing_netbank_names_netbank() {
    let (mut tables, loans) = fixture();
    tables.remove(&BankAccount::Netbank);

    let err = reconcile(&tables, &loans, oct_2024(), &BankAccount::ALL).unwrap_err();
    assert_eq!(err, ReconError::MissingSource(BankAccount::Netbank));
    assert!(err.to_string().contains("Netbank"));
}

#[test]
fn unparseable_credit_aborts_whole_run() {
    let (mut tables, loans) = fixture();
    tables.insert(
        BankAccount::Bpi,
        table(BankAccount::Bpi, &[(date(2024, 10, 9), "REVERSAL", "N/A")]).with_credit_column("Credit Amount"),
    );

    let err = reconcile_all(&tables, &loans, oct_2024()).unwrap_err();
    match &err {
        ReconError::Validation { bank, column, row, value } => {
            assert_eq!(*bank, BankAccount::Bpi);
            assert_eq!(column, "Credit Amount");
            assert_eq!(*row, 1);
            assert_eq!(value, "N/A");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    let msg = err.to_string();
    assert!(msg.contains("BPI") && msg.contains("Credit Amount") && msg.contains("row 1"));
}
