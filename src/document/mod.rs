//! Document model for docval.
//!
//! A `Document` carries the fields common to every submission plus a
//! type-specific payload. The payload is a sum type, so a bank statement can
//! never carry payslip fields.
//!
//! # File Format
//!
//! Documents are flat JSON or YAML objects tagged by `type`:
//!
//! ```text
//! {
//!   "id": "DOC-001",
//!   "type": "BankStatement",
//!   "customer_name": "Aoife Byrne",
//!   "upload_date": "2024-05-02T09:30:00Z",
//!   "account_number": "IE29AIBK93115212345678",
//!   "opening_balance": 1000.0,
//!   "closing_balance": "€1,250.40",
//!   "statement_date": "2024-04-30"
//! }
//! ```
//!
//! Keys belonging to another document type are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod fields;
mod io;
mod types;


pub use fields::{Amount, FieldError, FieldValue, parse_date};
pub use io::{LoadedDocument, load_documents, parse_documents};
pub use types::{COMMON_FIELDS, DocumentType};

/// A submitted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: String,

    pub customer_name: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "fields::optional_text"
    )]
    pub customer_dob: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "fields::optional_text"
    )]
    pub customer_address: Option<String>,

    /// When the document was submitted. Date rules are anchored here.
    pub upload_date: DateTime<Utc>,

    /// Type tag and type-specific fields.
    #[serde(flatten)]
    pub details: DocumentDetails,
}

/// Type-specific payload, tagged by `type` in the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DocumentDetails {
    #[serde(alias = "Bank Statement")]
    BankStatement(BankStatementFields),
    Payslip(PayslipFields),
    #[serde(rename = "IRP", alias = "Irish Residency Permit")]
    Irp(IrpFields),
    #[serde(rename = "PPSN", alias = "Personal Public Service Number")]
    Ppsn(PpsnFields),
    #[serde(alias = "Tax Record")]
    TaxRecord(TaxRecordFields),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankStatementFields {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "fields::optional_text"
    )]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_balance: Option<Amount>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "fields::optional_text"
    )]
    pub statement_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayslipFields {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "fields::optional_text"
    )]
    pub employer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_pay: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_pay: Option<Amount>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "fields::optional_text"
    )]
    pub pay_date: Option<String>,
}

/// Irish Residency Permit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrpFields {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "fields::optional_text"
    )]
    pub irp_number: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "fields::optional_text"
    )]
    pub nationality: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "fields::optional_text"
    )]
    pub expiry_date: Option<String>,
}

/// Personal Public Service Number card or letter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PpsnFields {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "fields::optional_text"
    )]
    pub ppsn_number: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "fields::optional_text"
    )]
    pub issue_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxRecordFields {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "fields::optional_text"
    )]
    pub tax_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_income: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_paid: Option<Amount>,
}

impl DocumentDetails {
    pub fn doc_type(&self) -> DocumentType {
        match self {
            DocumentDetails::BankStatement(_) => DocumentType::BankStatement,
            DocumentDetails::Payslip(_) => DocumentType::Payslip,
            DocumentDetails::Irp(_) => DocumentType::Irp,
            DocumentDetails::Ppsn(_) => DocumentType::Ppsn,
            DocumentDetails::TaxRecord(_) => DocumentType::TaxRecord,
        }
    }

    fn field(&self, name: &str) -> Option<Option<FieldValue<'_>>> {
        let value = match (self, name) {
            (DocumentDetails::BankStatement(f), "account_number") => text(&f.account_number),
            (DocumentDetails::BankStatement(f), "opening_balance") => amount(&f.opening_balance),
            (DocumentDetails::BankStatement(f), "closing_balance") => amount(&f.closing_balance),
            (DocumentDetails::BankStatement(f), "statement_date") => text(&f.statement_date),
            (DocumentDetails::Payslip(f), "employer_name") => text(&f.employer_name),
            (DocumentDetails::Payslip(f), "gross_pay") => amount(&f.gross_pay),
            (DocumentDetails::Payslip(f), "net_pay") => amount(&f.net_pay),
            (DocumentDetails::Payslip(f), "pay_date") => text(&f.pay_date),
            (DocumentDetails::Irp(f), "irp_number") => text(&f.irp_number),
            (DocumentDetails::Irp(f), "nationality") => text(&f.nationality),
            (DocumentDetails::Irp(f), "expiry_date") => text(&f.expiry_date),
            (DocumentDetails::Ppsn(f), "ppsn_number") => text(&f.ppsn_number),
            (DocumentDetails::Ppsn(f), "issue_date") => text(&f.issue_date),
            (DocumentDetails::TaxRecord(f), "tax_year") => text(&f.tax_year),
            (DocumentDetails::TaxRecord(f), "total_income") => amount(&f.total_income),
            (DocumentDetails::TaxRecord(f), "tax_paid") => amount(&f.tax_paid),
            _ => return None,
        };
        Some(value)
    }
}

fn text(value: &Option<String>) -> Option<FieldValue<'_>> {
    value.as_deref().map(FieldValue::Text)
}

fn amount(value: &Option<Amount>) -> Option<FieldValue<'_>> {
    value.as_ref().map(FieldValue::Amount)
}

impl Document {
    /// Create a document with the given payload, uploaded now.
    pub fn new(
        id: impl Into<String>,
        customer_name: impl Into<String>,
        details: DocumentDetails,
    ) -> Self {
        Self {
            id: id.into(),
            customer_name: customer_name.into(),
            customer_dob: None,
            customer_address: None,
            upload_date: Utc::now(),
            details,
        }
    }

    /// Set the upload timestamp.
    pub fn uploaded_at(mut self, upload_date: DateTime<Utc>) -> Self {
        self.upload_date = upload_date;
        self
    }

    /// Set the customer's date of birth.
    pub fn with_dob(mut self, dob: impl Into<String>) -> Self {
        self.customer_dob = Some(dob.into());
        self
    }

    pub fn doc_type(&self) -> DocumentType {
        self.details.doc_type()
    }

    /// Look up a field by name.
    ///
    /// Returns `Ok(None)` when the field exists for this document type but
    /// was not supplied, and `FieldError::UnknownField` when the name does not
    /// belong to this document type at all.
    pub fn field(&self, name: &str) -> std::result::Result<Option<FieldValue<'_>>, FieldError> {
        let common = match name {
            "id" => Some(Some(FieldValue::Text(&self.id))),
            "customer_name" => Some(Some(FieldValue::Text(&self.customer_name))),
            "customer_dob" => Some(self.customer_dob.as_deref().map(FieldValue::Text)),
            "customer_address" => Some(self.customer_address.as_deref().map(FieldValue::Text)),
            "upload_date" => Some(Some(FieldValue::Timestamp(self.upload_date))),
            _ => None,
        };

        common
            .or_else(|| self.details.field(name))
            .ok_or_else(|| FieldError::UnknownField {
                field: name.to_string(),
                doc_type: self.doc_type(),
            })
    }
}
