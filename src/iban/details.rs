use std::fmt;

use serde::Serialize;

use crate::iban::registry::{IbanCountrySpec, IBAN_PREFIX_LENGTH};
use crate::normalization::format_grouped;

const PRINT_GROUP: usize = 4;

/// Parts of a validated BBAN.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BbanDetails {
    bban: String,
    bank_code: String,
    branch_code: Option<String>,
    account_number: String,
}

impl BbanDetails {
    pub(crate) fn new(bban: &str, spec: &IbanCountrySpec) -> Self {
        let part = |range: &std::ops::Range<usize>| {
            bban.get(range.clone()).unwrap_or_default().to_owned()
        };
        BbanDetails {
            bban: bban.to_owned(),
            bank_code: part(&spec.bank_code),
            branch_code: spec.branch_code.as_ref().map(part),
            account_number: part(&spec.account_number),
        }
    }

    pub fn bban(&self) -> &str {
        &self.bban
    }

    pub fn bank_code(&self) -> &str {
        &self.bank_code
    }

    pub fn branch_code(&self) -> Option<&str> {
        self.branch_code.as_deref()
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }
}

/// A validated IBAN split into its parts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IbanDetails {
    country_code: String,
    check_digits: String,
    bban: BbanDetails,
}

impl IbanDetails {
    /// `iban` must be canonical and already validated against `spec`.
    pub(crate) fn new(iban: &str, spec: &IbanCountrySpec) -> Self {
        IbanDetails {
            country_code: iban[..2].to_owned(),
            check_digits: iban[2..IBAN_PREFIX_LENGTH].to_owned(),
            bban: BbanDetails::new(&iban[IBAN_PREFIX_LENGTH..], spec),
        }
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn check_digits(&self) -> &str {
        &self.check_digits
    }

    pub fn bban(&self) -> &BbanDetails {
        &self.bban
    }

    /// The IBAN without any separator, as used in payment messages.
    pub fn electronic_format(&self) -> String {
        format!("{}{}{}", self.country_code, self.check_digits, self.bban.bban)
    }

    /// The IBAN in groups of four characters.
    pub fn print_format(&self) -> String {
        format_grouped(&self.electronic_format(), PRINT_GROUP)
    }
}

impl fmt::Display for IbanDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print_format())
    }
}
