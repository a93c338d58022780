//! Raw field values and their lazy parsing.
//!
//! Documents keep amounts and dates exactly as submitted. Parsing happens
//! when a rule reads the field, so a malformed value surfaces as an issue on
//! that rule instead of rejecting the whole document at load time.

use super::DocumentType;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Date formats accepted in document fields, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// A monetary amount as submitted: a JSON number or free text such as `"€1,200.50"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Parse the amount into a finite number.
    ///
    /// Text may carry a currency symbol or code, thousands separators, and
    /// accounting-style parentheses for negatives (`"(120.50)"`).
    pub fn value(&self) -> std::result::Result<f64, String> {
        match self {
            Amount::Number(n) if n.is_finite() => Ok(*n),
            Amount::Number(n) => Err(format!("{} is not a finite number", n)),
            Amount::Text(text) => parse_amount_text(text),
        }
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::Number(value)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Text(value.to_string())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{:.2}", n),
            Amount::Text(text) => f.write_str(text),
        }
    }
}

fn parse_amount_text(text: &str) -> std::result::Result<f64, String> {
    let mut s = text.trim();
    let mut negative = false;

    if let Some(inner) = s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        negative = true;
        s = inner.trim();
    }
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest.trim();
    }
    for prefix in ["EUR", "GBP", "USD", "€", "£", "$"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.trim();
            break;
        }
    }

    let cleaned: String = s.chars().filter(|c| *c != ',' && *c != ' ').collect();
    if cleaned.is_empty() {
        return Err("no digits".to_string());
    }

    let value: f64 = cleaned
        .parse()
        .map_err(|_| format!("'{}' is not a number", text.trim()))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", text.trim()));
    }

    Ok(if negative { -value } else { value })
}

/// Parse a document date (`YYYY-MM-DD`, `DD/MM/YYYY`, `DD-MM-YYYY`, or RFC 3339).
pub fn parse_date(text: &str) -> std::result::Result<NaiveDate, String> {
    let text = text.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.date_naive())
        .map_err(|_| format!("'{}' is not a recognised date", text))
}

/// Deserialize an optional text field, keeping scalars in their text form.
///
/// YAML writes `tax_year: 2023` and `account_number: 12345678` as numbers;
/// they are read as text so that the rules, not the loader, judge them.
pub(super) fn optional_text<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Unsigned(u64),
        Float(f64),
        Bool(bool),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Integer(n) => n.to_string(),
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

/// A problem reading a field from a document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("field '{field}' has malformed value '{value}': {reason}")]
    Malformed {
        field: String,
        value: String,
        reason: String,
    },

    #[error("field '{field}' is not defined for {doc_type} documents")]
    UnknownField { field: String, doc_type: DocumentType },

    #[error("field '{field}' is not a {expected} field")]
    WrongKind {
        field: String,
        expected: &'static str,
    },
}

/// A borrowed view of one document field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Amount(&'a Amount),
    Timestamp(DateTime<Utc>),
}

impl<'a> FieldValue<'a> {
    /// Whether the value carries no information (empty or whitespace text).
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Amount(Amount::Text(text)) => text.trim().is_empty(),
            FieldValue::Amount(Amount::Number(_)) | FieldValue::Timestamp(_) => false,
        }
    }

    pub fn as_text(&self, field: &str) -> std::result::Result<&'a str, FieldError> {
        match self {
            FieldValue::Text(text) => Ok(text),
            _ => Err(FieldError::WrongKind {
                field: field.to_string(),
                expected: "text",
            }),
        }
    }

    pub fn to_amount(&self, field: &str) -> std::result::Result<f64, FieldError> {
        match self {
            FieldValue::Amount(amount) => amount.value().map_err(|reason| FieldError::Malformed {
                field: field.to_string(),
                value: amount.to_string(),
                reason,
            }),
            _ => Err(FieldError::WrongKind {
                field: field.to_string(),
                expected: "amount",
            }),
        }
    }

    pub fn to_date(&self, field: &str) -> std::result::Result<NaiveDate, FieldError> {
        match self {
            FieldValue::Timestamp(ts) => Ok(ts.date_naive()),
            FieldValue::Text(text) => parse_date(text).map_err(|reason| FieldError::Malformed {
                field: field.to_string(),
                value: text.to_string(),
                reason,
            }),
            FieldValue::Amount(_) => Err(FieldError::WrongKind {
                field: field.to_string(),
                expected: "date",
            }),
        }
    }

    /// Render the value for issue descriptions.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(text) => text.trim().to_string(),
            FieldValue::Amount(amount) => match amount.value() {
                Ok(n) => format!("{:.2}", n),
                Err(_) => amount.to_string(),
            },
            FieldValue::Timestamp(ts) => ts.to_rfc3339(),
        }
    }
}
