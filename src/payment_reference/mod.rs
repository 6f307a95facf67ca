//! Structured payment references: ISO 11649 creditor references (`RF`), Finnish
//! national references and Norwegian KID numbers.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::checksum::{
    luhn_is_valid, mod97_chars, mod97_check_digits, CheckValue, Mod11Outcome, Mod11Rule,
    TenPolicy,
};
use crate::normalization::{format_grouped, normalize};
use crate::observability::metrics::ValidationMetrics;
use crate::validation::{ErrorCode, ValidationError, ValidationResult};

pub(crate) const PAYMENT_REFERENCE_FAMILY: &str = "payment_reference";

const RF_PREFIX: &str = "RF";
const RF_MAX_PAYLOAD: usize = 21;
const FINNISH_WEIGHTS: [u32; 3] = [7, 3, 1];
const FINNISH_LENGTH: std::ops::RangeInclusive<usize> = 4..=20;
const KID_LENGTH: std::ops::RangeInclusive<usize> = 2..=25;

lazy_static! {
    static ref RF_PATTERN: Regex = Regex::new(r"^RF[0-9]{2}[0-9A-Z]{1,21}$").unwrap();
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReferenceFormat {
    /// ISO 11649 creditor reference
    Rf,
    /// Finnish national reference number (viitenumero)
    Finnish,
    /// Norwegian customer identification number
    NorwegianKid,
}

/// Formats tried, in order, when the caller does not name one and the
/// reference does not start with `RF`.
const NATIONAL_FORMATS: [ReferenceFormat; 2] =
    [ReferenceFormat::Finnish, ReferenceFormat::NorwegianKid];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaymentReferenceDetails {
    format: ReferenceFormat,
    reference: String,
    check_digits: String,
    payload: String,
}

impl PaymentReferenceDetails {
    fn new(format: ReferenceFormat, reference: &str) -> Self {
        let split = match format {
            ReferenceFormat::Rf => RF_PREFIX.len(),
            ReferenceFormat::Finnish | ReferenceFormat::NorwegianKid => reference.len() - 1,
        };
        let (check_digits, payload) = match format {
            ReferenceFormat::Rf => (&reference[split..split + 2], &reference[split + 2..]),
            ReferenceFormat::Finnish | ReferenceFormat::NorwegianKid => {
                (&reference[split..], &reference[..split])
            }
        };
        PaymentReferenceDetails {
            format,
            reference: reference.to_owned(),
            check_digits: check_digits.to_owned(),
            payload: payload.to_owned(),
        }
    }

    pub fn format(&self) -> ReferenceFormat {
        self.format
    }

    /// The reference in electronic form.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn check_digits(&self) -> &str {
        &self.check_digits
    }

    /// The reference without its check digits, and without `RF` for creditor references.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Creditor references print in groups of four. National references print
    /// as they are.
    pub fn print_format(&self) -> String {
        match self.format {
            ReferenceFormat::Rf => format_grouped(&self.reference, 4),
            ReferenceFormat::Finnish | ReferenceFormat::NorwegianKid => self.reference.clone(),
        }
    }
}

/// Validates `raw` as a payment reference of `format`.
///
/// Without a format, a reference starting with `RF` must be a creditor
/// reference. Anything else is accepted if it is a valid Finnish reference or
/// KID; if it is neither, the result carries the Finnish error followed by the
/// KID one.
pub fn validate_payment_reference(
    raw: &str,
    format: Option<ReferenceFormat>,
) -> ValidationResult {
    let canonical = normalize(raw);
    let result = match detect(&canonical, format) {
        Ok(_) => ValidationResult::success(),
        Err(errors) => ValidationResult::from_errors(errors),
    };
    ValidationMetrics::new(PAYMENT_REFERENCE_FAMILY).record(&result);
    result
}

pub fn parse_payment_reference(
    raw: &str,
    format: Option<ReferenceFormat>,
) -> Option<PaymentReferenceDetails> {
    let canonical = normalize(raw);
    let format = detect(&canonical, format).ok()?;
    Some(PaymentReferenceDetails::new(format, &canonical))
}

/// Builds a creditor reference around `payload`, e.g. `RF47ABC123` for `abc 123`.
pub fn create_rf_reference(payload: &str) -> Result<String, ValidationError> {
    let payload = normalize(payload);
    if payload.is_empty() {
        return Err(ValidationError::new(
            ErrorCode::InvalidInput,
            "reference payload is empty",
        ));
    }
    if payload.len() > RF_MAX_PAYLOAD {
        return Err(ValidationError::new(
            ErrorCode::InvalidLength,
            format!("creditor reference payloads have at most {RF_MAX_PAYLOAD} characters"),
        ));
    }
    let check_digits = mod97_check_digits(&format!("{payload}{RF_PREFIX}")).ok_or_else(|| {
        ValidationError::new(ErrorCode::InvalidFormat, "payload must be letters and digits")
    })?;
    Ok(format!("{RF_PREFIX}{check_digits:02}{payload}"))
}

fn detect(
    reference: &str,
    format: Option<ReferenceFormat>,
) -> Result<ReferenceFormat, Vec<ValidationError>> {
    if reference.is_empty() {
        return Err(vec![ValidationError::new(
            ErrorCode::InvalidInput,
            "payment reference is empty",
        )]);
    }
    let candidates: &[ReferenceFormat] = match format {
        Some(ref format) => std::slice::from_ref(format),
        None if reference.starts_with(RF_PREFIX) => &[ReferenceFormat::Rf],
        None => &NATIONAL_FORMATS,
    };
    let mut errors = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match check(*candidate, reference) {
            Ok(()) => return Ok(*candidate),
            Err(err) => errors.push(err),
        }
    }
    Err(errors)
}

fn check(format: ReferenceFormat, reference: &str) -> Result<(), ValidationError> {
    match format {
        ReferenceFormat::Rf => check_rf(reference),
        ReferenceFormat::Finnish => check_finnish(reference),
        ReferenceFormat::NorwegianKid => check_kid(reference),
    }
}

fn check_rf(reference: &str) -> Result<(), ValidationError> {
    if !reference.starts_with(RF_PREFIX) {
        return Err(ValidationError::new(
            ErrorCode::InvalidFormat,
            "creditor references start with RF",
        ));
    }
    if !(5..=RF_PREFIX.len() + 2 + RF_MAX_PAYLOAD).contains(&reference.len()) {
        return Err(ValidationError::new(
            ErrorCode::InvalidLength,
            format!(
                "creditor references have 5 to 25 characters, found {}",
                reference.len()
            ),
        ));
    }
    if !RF_PATTERN.is_match(reference) {
        return Err(ValidationError::new(
            ErrorCode::InvalidFormat,
            "check digits must be numeric",
        ));
    }
    if !("02"..="98").contains(&&reference[2..4]) {
        return Err(ValidationError::new(
            ErrorCode::InvalidCheckDigit,
            "check digits must be between 02 and 98",
        ));
    }
    let rearranged = reference[4..].chars().chain(reference[..4].chars());
    if mod97_chars(rearranged) != Some(1) {
        return Err(ValidationError::new(
            ErrorCode::InvalidChecksum,
            "creditor reference checksum does not match",
        ));
    }
    Ok(())
}

/// Digits of a national reference, with its length checked.
fn national_digits(
    name: &str,
    reference: &str,
    lengths: std::ops::RangeInclusive<usize>,
) -> Result<(), ValidationError> {
    if !reference.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::new(
            ErrorCode::InvalidFormat,
            format!("{name} references contain digits only"),
        ));
    }
    if !lengths.contains(&reference.len()) {
        return Err(ValidationError::new(
            ErrorCode::InvalidLength,
            format!(
                "{name} references have {} to {} digits, found {}",
                lengths.start(),
                lengths.end(),
                reference.len()
            ),
        ));
    }
    Ok(())
}

fn check_finnish(reference: &str) -> Result<(), ValidationError> {
    national_digits("Finnish", reference, FINNISH_LENGTH)?;
    let (payload, check) = reference.split_at(reference.len() - 1);
    let sum: u32 = payload
        .bytes()
        .rev()
        .zip(FINNISH_WEIGHTS.iter().cycle())
        .map(|(b, w)| u32::from(b - b'0') * w)
        .sum();
    let expected = (10 - sum % 10) % 10;
    if check.bytes().next().map(|b| u32::from(b - b'0')) != Some(expected) {
        return Err(ValidationError::new(
            ErrorCode::InvalidCheckDigit,
            "check digit does not match",
        ));
    }
    Ok(())
}

/// KID numbers carry either a Luhn or a modulo-11 check digit, chosen by the
/// payee. Either one is accepted.
fn check_kid(reference: &str) -> Result<(), ValidationError> {
    national_digits("KID", reference, KID_LENGTH)?;
    if luhn_is_valid(reference) {
        return Ok(());
    }
    let payload_length = reference.len() - 1;
    let weights = (0..payload_length as u32).rev().map(|i| 2 + i % 6).collect();
    let rule = Mod11Rule::new(weights, CheckValue::Complement, TenPolicy::Forbidden);
    match rule.verify_trailing(reference) {
        Mod11Outcome::Valid => Ok(()),
        _ => Err(ValidationError::new(
            ErrorCode::InvalidCheckDigit,
            "check digit matches neither Luhn nor modulo 11",
        )),
    }
}
