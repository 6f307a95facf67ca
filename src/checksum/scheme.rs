use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::checksum::{
    digit_values, iso7064_mod11_10_is_valid, luhn_is_valid, mod97, Mod11Outcome, Mod11Rule,
};
use crate::error::RegistryError;
use crate::validation::{ErrorCode, ValidationError};

const IRISH_CHECK_LETTERS: &[u8; 23] = b"WABCDEFGHIJKLMNOPQRSTUV";

/// Mod-97 check digits are a number below 98, so at most two positions.
pub const MAX_MOD97_CHECK_WIDTH: usize = 2;

/// Largest weight a weighted scheme accepts.
pub const MAX_WEIGHT: u32 = 99;

/// A check-digit rule bound to positions inside an already structurally valid,
/// canonical identifier body.
///
/// Positions are byte offsets into the body. Registries verify at construction
/// time that every position fits inside the layout the scheme is attached to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckDigitScheme {
    /// Luhn over the range, check digit last.
    Luhn { range: Range<usize> },
    /// ISO 7064 MOD 11,10 over the range, check digit last.
    Iso7064Mod11_10 { range: Range<usize> },
    /// Weighted modulo 11 over `payload`, compared with the digit at `check`.
    Mod11 {
        payload: Range<usize>,
        check: usize,
        rule: Mod11Rule,
    },
    /// Weighted sum over the range must be a multiple of 10.
    WeightedMod10 { range: Range<usize>, weights: Vec<u32> },
    /// The range read as a number is congruent to 1 modulo 97.
    Mod97 { range: Range<usize> },
    /// `check` equals `payload mod 97`, a remainder of 0 written as 97.
    Mod97Remainder {
        payload: Range<usize>,
        check: Range<usize>,
    },
    /// `check` equals `97 - payload mod 97`.
    Mod97Complement {
        payload: Range<usize>,
        check: Range<usize>,
    },
    /// `U` followed by seven digits and a check digit, Luhn variant offset by 4.
    AustrianVat,
    /// Two-character key followed by the 9-digit SIREN.
    ///
    /// Only numeric keys are verified. Alphanumeric keys follow an unpublished
    /// rule and are accepted as they are.
    FrenchVatKey,
    /// Seven digits, a check letter, and an optional trailing letter that takes
    /// part in the sum.
    IrishVat,
}

impl CheckDigitScheme {
    /// Number of characters the body needs for every position to exist.
    pub fn span(&self) -> usize {
        match self {
            Self::Luhn { range }
            | Self::Iso7064Mod11_10 { range }
            | Self::WeightedMod10 { range, .. }
            | Self::Mod97 { range } => range.end,
            Self::Mod11 { payload, check, .. } => payload.end.max(check.saturating_add(1)),
            Self::Mod97Remainder { payload, check } | Self::Mod97Complement { payload, check } => {
                payload.end.max(check.end)
            }
            Self::AustrianVat => 9,
            Self::FrenchVatKey => 11,
            Self::IrishVat => 8,
        }
    }

    /// `(weights, digits)` when a weight table does not cover its payload exactly.
    pub fn weight_mismatch(&self) -> Option<(usize, usize)> {
        let (weights, digits) = match self {
            Self::Mod11 { payload, rule, .. } => (rule.weights.len(), payload.len()),
            Self::WeightedMod10 { range, weights } => (weights.len(), range.len()),
            _ => return None,
        };
        (weights != digits).then_some((weights, digits))
    }

    /// Width of a mod-97 `check` range that is empty or wider than
    /// [MAX_MOD97_CHECK_WIDTH].
    pub fn invalid_check_width(&self) -> Option<usize> {
        match self {
            Self::Mod97Remainder { check, .. } | Self::Mod97Complement { check, .. } => {
                let width = check.len();
                (width == 0 || width > MAX_MOD97_CHECK_WIDTH).then_some(width)
            }
            _ => None,
        }
    }

    /// The first weight above [MAX_WEIGHT].
    pub fn oversized_weight(&self) -> Option<u32> {
        let weights = match self {
            Self::Mod11 { rule, .. } => &rule.weights,
            Self::WeightedMod10 { weights, .. } => weights,
            _ => return None,
        };
        weights.iter().copied().find(|w| *w > MAX_WEIGHT)
    }

    /// Checks that the scheme can run on every body of `length` characters
    /// without reading past it or overflowing its arithmetic.
    pub(crate) fn check_table(&self, country: &str, length: usize) -> Result<(), RegistryError> {
        if self.span() > length {
            return Err(RegistryError::RangeOutOfBounds {
                country: country.to_owned(),
                end: self.span(),
                length,
            });
        }
        if let Some((weights, digits)) = self.weight_mismatch() {
            return Err(RegistryError::WeightCount {
                country: country.to_owned(),
                weights,
                digits,
            });
        }
        if let Some(width) = self.invalid_check_width() {
            return Err(RegistryError::CheckWidth {
                country: country.to_owned(),
                width,
            });
        }
        if let Some(weight) = self.oversized_weight() {
            return Err(RegistryError::WeightTooLarge {
                country: country.to_owned(),
                weight,
            });
        }
        Ok(())
    }

    pub fn verify(&self, body: &str) -> Result<(), ValidationError> {
        match self {
            Self::Luhn { range } => {
                if !luhn_is_valid(slice(body, range)?) {
                    return Err(checksum_mismatch("Luhn"));
                }
            }
            Self::Iso7064Mod11_10 { range } => {
                if !iso7064_mod11_10_is_valid(slice(body, range)?) {
                    return Err(checksum_mismatch("ISO 7064 MOD 11,10"));
                }
            }
            Self::Mod11 {
                payload,
                check,
                rule,
            } => {
                let check_char = slice(body, &(*check..check.saturating_add(1)))?
                    .chars()
                    .next()
                    .unwrap_or_default();
                match rule.verify(slice(body, payload)?, check_char) {
                    Mod11Outcome::Valid => {}
                    Mod11Outcome::Mismatch => return Err(check_digit_mismatch()),
                    Mod11Outcome::ForbiddenRemainder => {
                        return Err(ValidationError::new(
                            ErrorCode::InvalidIdentifier,
                            "weighted sum yields a remainder no valid number can have",
                        ))
                    }
                    Mod11Outcome::Malformed => return Err(not_numeric()),
                }
            }
            Self::WeightedMod10 { range, weights } => {
                let digits = digits(body, range)?;
                let sum = digits
                    .iter()
                    .zip(weights)
                    .fold(0, |acc, (d, w)| (acc + d * w) % 10);
                if sum != 0 {
                    return Err(checksum_mismatch("weighted modulo 10"));
                }
            }
            Self::Mod97 { range } => {
                if mod97(slice(body, range)?) != Some(1) {
                    return Err(checksum_mismatch("modulo 97"));
                }
            }
            Self::Mod97Remainder { payload, check } => {
                let expected = match mod97_digits(body, payload)? {
                    0 => 97,
                    remainder => remainder,
                };
                compare(expected, number(body, check)?)?;
            }
            Self::Mod97Complement { payload, check } => {
                let expected = 97 - mod97_digits(body, payload)?;
                compare(expected, number(body, check)?)?;
            }
            Self::AustrianVat => austrian_vat(body)?,
            Self::FrenchVatKey => french_vat_key(body)?,
            Self::IrishVat => irish_vat(body)?,
        }
        Ok(())
    }
}

fn slice<'a>(body: &'a str, range: &Range<usize>) -> Result<&'a str, ValidationError> {
    body.get(range.clone()).ok_or_else(|| {
        ValidationError::new(
            ErrorCode::InvalidLength,
            format!("expected at least {} characters", range.end),
        )
    })
}

fn digits(body: &str, range: &Range<usize>) -> Result<Vec<u32>, ValidationError> {
    digit_values(slice(body, range)?).ok_or_else(not_numeric)
}

fn number(body: &str, range: &Range<usize>) -> Result<u32, ValidationError> {
    let digits = digits(body, range)?;
    Ok(digits.iter().fold(0, |n, d| n * 10 + d))
}

fn mod97_digits(body: &str, range: &Range<usize>) -> Result<u32, ValidationError> {
    let payload = slice(body, range)?;
    if !payload.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_numeric());
    }
    mod97(payload).ok_or_else(not_numeric)
}

fn compare(expected: u32, actual: u32) -> Result<(), ValidationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(check_digit_mismatch())
    }
}

/// Sum all the digits from a number
#[inline]
fn sum_all_digits(digits: u32) -> u32 {
    let mut sum = 0;
    let mut num = digits;
    while num > 0 {
        sum += num % 10;
        num /= 10;
    }
    sum
}

fn austrian_vat(body: &str) -> Result<(), ValidationError> {
    if !body.starts_with('U') {
        return Err(ValidationError::new(
            ErrorCode::InvalidFormat,
            "number must start with U",
        ));
    }
    let digits = digits(body, &(1..9))?;
    let sum: u32 = digits[..7]
        .iter()
        .enumerate()
        .map(|(idx, digit)| {
            if idx % 2 == 1 {
                sum_all_digits(digit * 2)
            } else {
                *digit
            }
        })
        .sum();
    compare((10 - (sum + 4) % 10) % 10, digits[7])
}

fn french_vat_key(body: &str) -> Result<(), ValidationError> {
    let key = slice(body, &(0..2))?;
    let siren = mod97_digits(body, &(2..11))?;
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(());
    }
    compare((12 + 3 * siren) % 97, number(body, &(0..2))?)
}

fn irish_vat(body: &str) -> Result<(), ValidationError> {
    let digits = digits(body, &(0..7))?;
    let mut sum: u32 = digits
        .iter()
        .zip((2..=8).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    // the second letter is W for 0 or A to I for 1 to 9
    sum += match body.chars().nth(8) {
        None | Some('W') => 0,
        Some(extra @ 'A'..='I') => (extra as u32 - 'A' as u32 + 1) * 9,
        Some(_) => {
            return Err(ValidationError::new(
                ErrorCode::InvalidFormat,
                "trailing letter must be W or one of A to I",
            ))
        }
    };
    let expected = IRISH_CHECK_LETTERS[(sum % 23) as usize];
    match body.as_bytes().get(7) {
        Some(actual) if *actual == expected => Ok(()),
        Some(_) => Err(check_digit_mismatch()),
        None => Err(ValidationError::new(
            ErrorCode::InvalidLength,
            "missing check letter",
        )),
    }
}

fn checksum_mismatch(algorithm: &str) -> ValidationError {
    ValidationError::new(
        ErrorCode::InvalidChecksum,
        format!("{algorithm} checksum does not match"),
    )
}

fn check_digit_mismatch() -> ValidationError {
    ValidationError::new(ErrorCode::InvalidCheckDigit, "check digit does not match")
}

fn not_numeric() -> ValidationError {
    ValidationError::new(ErrorCode::InvalidFormat, "expected digits only")
}
