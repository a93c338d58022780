use crate::document::{
    Amount, BankStatementFields, Document, DocumentDetails, IrpFields, PayslipFields, PpsnFields,
    TaxRecordFields,
};
use chrono::{DateTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Upload timestamp shared by every fixture: 2024-05-02T09:30:00Z.
pub(crate) fn upload_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap()
}

fn fixture(id: &str, customer: &str, details: DocumentDetails) -> Document {
    Document::new(id, customer, details).uploaded_at(upload_time())
}

/// A bank statement dated two days before upload with the given balances.
pub(crate) fn bank_statement(id: &str, opening: f64, closing: f64) -> Document {
    fixture(
        id,
        "Aoife Byrne",
        DocumentDetails::BankStatement(BankStatementFields {
            account_number: Some("IE29AIBK93115212345678".to_string()),
            opening_balance: Some(Amount::from(opening)),
            closing_balance: Some(Amount::from(closing)),
            statement_date: Some("2024-04-30".to_string()),
        }),
    )
    .with_dob("1988-11-02")
}

/// A clean payslip: gross 3000, net 2400, paid 2024-04-26.
pub(crate) fn payslip(id: &str) -> Document {
    fixture(
        id,
        "Ciara Walsh",
        DocumentDetails::Payslip(PayslipFields {
            employer_name: Some("Acme Ltd".to_string()),
            gross_pay: Some(Amount::from(3000.0)),
            net_pay: Some(Amount::from(2400.0)),
            pay_date: Some("2024-04-26".to_string()),
        }),
    )
}

/// A residency permit valid well past the expiry warning window.
pub(crate) fn irp(id: &str) -> Document {
    fixture(
        id,
        "Lucas Oliveira",
        DocumentDetails::Irp(IrpFields {
            irp_number: Some("AB1234567".to_string()),
            nationality: Some("Brazilian".to_string()),
            expiry_date: Some("2025-09-30".to_string()),
        }),
    )
}

/// A PPSN with a correct check character.
pub(crate) fn ppsn(id: &str) -> Document {
    fixture(
        id,
        "Niamh Kelly",
        DocumentDetails::Ppsn(PpsnFields {
            ppsn_number: Some("1234567T".to_string()),
            issue_date: Some("2015-03-10".to_string()),
        }),
    )
}

/// A 2023 tax record with income 48000 and tax paid 9600.
pub(crate) fn tax_record(id: &str) -> Document {
    fixture(
        id,
        "Sean Murphy",
        DocumentDetails::TaxRecord(TaxRecordFields {
            tax_year: Some("2023".to_string()),
            total_income: Some(Amount::from(48000.0)),
            tax_paid: Some(Amount::from(9600.0)),
        }),
    )
}
