//! Document type tag.

use crate::error::{DocvalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of document kinds a customer can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    BankStatement,
    Payslip,
    #[serde(rename = "IRP")]
    Irp,
    #[serde(rename = "PPSN")]
    Ppsn,
    TaxRecord,
}

impl DocumentType {
    /// Every document type, in display order.
    pub const ALL: [DocumentType; 5] = [
        DocumentType::BankStatement,
        DocumentType::Payslip,
        DocumentType::Irp,
        DocumentType::Ppsn,
        DocumentType::TaxRecord,
    ];

    /// Canonical tag used in document files (`"type": "BankStatement"`).
    pub fn tag(&self) -> &'static str {
        match self {
            DocumentType::BankStatement => "BankStatement",
            DocumentType::Payslip => "Payslip",
            DocumentType::Irp => "IRP",
            DocumentType::Ppsn => "PPSN",
            DocumentType::TaxRecord => "TaxRecord",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentType::BankStatement => "Bank Statement",
            DocumentType::Payslip => "Payslip",
            DocumentType::Irp => "Irish Residency Permit",
            DocumentType::Ppsn => "Personal Public Service Number",
            DocumentType::TaxRecord => "Tax Record",
        }
    }
}

/// Fields shared by every document type.
pub const COMMON_FIELDS: &[&str] = &[
    "id",
    "customer_name",
    "customer_dob",
    "customer_address",
    "upload_date",
];

impl DocumentType {
    /// Type-specific field names, in declaration order.
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            DocumentType::BankStatement => &[
                "account_number",
                "opening_balance",
                "closing_balance",
                "statement_date",
            ],
            DocumentType::Payslip => &["employer_name", "gross_pay", "net_pay", "pay_date"],
            DocumentType::Irp => &["irp_number", "nationality", "expiry_date"],
            DocumentType::Ppsn => &["ppsn_number", "issue_date"],
            DocumentType::TaxRecord => &["tax_year", "total_income", "tax_paid"],
        }
    }

    /// Whether `name` is a common field or one of this type's fields.
    pub fn has_field(&self, name: &str) -> bool {
        COMMON_FIELDS.contains(&name) || self.field_names().contains(&name)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for DocumentType {
    type Err = DocvalError;

    /// Accepts the tag, the display name, and snake/kebab/space separated
    /// spellings, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "bankstatement" => Ok(DocumentType::BankStatement),
            "payslip" => Ok(DocumentType::Payslip),
            "irp" | "irishresidencypermit" => Ok(DocumentType::Irp),
            "ppsn" | "personalpublicservicenumber" => Ok(DocumentType::Ppsn),
            "taxrecord" => Ok(DocumentType::TaxRecord),
            _ => Err(DocvalError::InvalidDocumentType(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tags_and_display_names() {
        for doc_type in DocumentType::ALL {
            assert_eq!(doc_type.tag().parse::<DocumentType>().unwrap(), doc_type);
            assert_eq!(
                doc_type.display_name().parse::<DocumentType>().unwrap(),
                doc_type
            );
        }
    }

    #[test]
    fn parses_loose_spellings() {
        assert_eq!(
            "bank_statement".parse::<DocumentType>().unwrap(),
            DocumentType::BankStatement
        );
        assert_eq!(
            "tax-record".parse::<DocumentType>().unwrap(),
            DocumentType::TaxRecord
        );
        assert_eq!("ppsn".parse::<DocumentType>().unwrap(), DocumentType::Ppsn);
    }

    #[test]
    fn unknown_type_is_invalid_document_type() {
        let err = "Passport".parse::<DocumentType>().unwrap_err();
        assert!(matches!(err, DocvalError::InvalidDocumentType(ref name) if name == "Passport"));
    }

    #[test]
    fn field_names_are_type_specific() {
        assert!(DocumentType::BankStatement.has_field("closing_balance"));
        assert!(DocumentType::BankStatement.has_field("customer_name"));
        assert!(!DocumentType::Ppsn.has_field("gross_pay"));
    }

    #[test]
    fn serde_uses_tags() {
        let json = serde_json::to_string(&DocumentType::Irp).unwrap();
        assert_eq!(json, "\"IRP\"");
        let parsed: DocumentType = serde_json::from_str("\"TaxRecord\"").unwrap();
        assert_eq!(parsed, DocumentType::TaxRecord);
    }
}
