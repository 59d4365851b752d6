//! Phone normalization.
//!
//! The form collects UAE mobile numbers in any shape (`+971 50 123 4567`,
//! `0501234567`, `501234567`). Only the trailing nine digits identify the
//! subscriber; the CRM stores them as `+971-XXXXXXXXX` and the sheet keeps
//! the bare digits.

/// Country prefix the CRM expects in front of the local number.
pub const CRM_PREFIX: &str = "+971-";
/// Length of a local UAE mobile number without trunk or country prefix.
pub const LOCAL_DIGITS: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPhone {
    /// `+971-` followed by up to nine digits.
    pub crm: String,
    /// Up to nine digits, as written to the sheet.
    pub sheet: String,
}

impl NormalizedPhone {
    /// True when the trailing digits form a full nine-digit local number.
    pub fn is_complete(&self) -> bool {
        is_local_mobile(&self.sheet)
    }
}

pub fn normalize(raw: &str) -> NormalizedPhone {
    let digits: Vec<char> = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let start = digits.len().saturating_sub(LOCAL_DIGITS);
    let local: String = digits[start..].iter().collect();
    NormalizedPhone {
        crm: format!("{CRM_PREFIX}{local}"),
        sheet: local,
    }
}

/// First-page validation rule: exactly nine ASCII digits.
pub fn is_local_mobile(input: &str) -> bool {
    input.len() == LOCAL_DIGITS && input.bytes().all(|b| b.is_ascii_digit())
}

/// Masked form for logs: only the last four digits survive.
pub fn mask(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let keep = digits.len().min(4);
    let hidden = digits.len() - keep;
    let tail: String = digits[hidden..].iter().collect();
    format!("{}{}", "*".repeat(hidden), tail)
}
