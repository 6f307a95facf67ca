use serde::{Deserialize, Serialize};

use crate::checksum::digit_values;

const MODULUS: u32 = 11;

/// `Σ digits[i] * weights[i]`.
///
/// Panics if the two slices differ in length. Callers own both arrays, so a
/// mismatch is a bug in the caller and not a property of the data.
pub fn weighted_sum(digits: &[u32], weights: &[u32]) -> u32 {
    assert_eq!(
        digits.len(),
        weights.len(),
        "weighted sum needs exactly one weight per digit"
    );
    digits.iter().zip(weights).map(|(d, w)| d * w).sum()
}

/// How the remainder of the weighted sum becomes a check value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckValue {
    /// The check value is the remainder itself.
    Remainder,
    /// The check value is `11 - remainder`, with 11 folded to 0.
    Complement,
}

/// What a check value of 10 means, since it does not fit in one decimal digit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenPolicy {
    /// Numbers producing it are never issued.
    Forbidden,
    Zero,
    One,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mod11Outcome {
    Valid,
    Mismatch,
    /// The weighted sum lands on a remainder no valid number can have. This is
    /// reported whatever the value of the trailing digit.
    ForbiddenRemainder,
    /// Non-digit input, or a payload that does not match the weight count.
    Malformed,
}

/// One member of the weighted modulo-11 family: a weight table plus the rule
/// turning its remainder into a check digit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mod11Rule {
    pub weights: Vec<u32>,
    pub check_value: CheckValue,
    pub on_ten: TenPolicy,
}

impl Mod11Rule {
    pub fn new(weights: Vec<u32>, check_value: CheckValue, on_ten: TenPolicy) -> Self {
        Self {
            weights,
            check_value,
            on_ten,
        }
    }

    /// Check digit for `payload`, or the outcome explaining why there is none.
    pub fn check_digit(&self, payload: &str) -> Result<u32, Mod11Outcome> {
        let digits = digit_values(payload).ok_or(Mod11Outcome::Malformed)?;
        if digits.len() != self.weights.len() {
            return Err(Mod11Outcome::Malformed);
        }
        let remainder = weighted_sum(&digits, &self.weights) % MODULUS;
        let value = match self.check_value {
            CheckValue::Remainder => remainder,
            CheckValue::Complement => (MODULUS - remainder) % MODULUS,
        };
        match (value, self.on_ten) {
            (10, TenPolicy::Forbidden) => Err(Mod11Outcome::ForbiddenRemainder),
            (10, TenPolicy::Zero) => Ok(0),
            (10, TenPolicy::One) => Ok(1),
            (value, _) => Ok(value),
        }
    }

    /// Compares `check` with the check digit computed over `payload`.
    pub fn verify(&self, payload: &str, check: char) -> Mod11Outcome {
        let Some(actual) = check.to_digit(10) else {
            return Mod11Outcome::Malformed;
        };
        match self.check_digit(payload) {
            Ok(expected) if expected == actual => Mod11Outcome::Valid,
            Ok(_) => Mod11Outcome::Mismatch,
            Err(outcome) => outcome,
        }
    }

    /// [Mod11Rule::verify] for a string whose last digit is the check digit.
    pub fn verify_trailing(&self, digits: &str) -> Mod11Outcome {
        let mut chars = digits.chars();
        match chars.next_back() {
            Some(check) => self.verify(chars.as_str(), check),
            None => Mod11Outcome::Malformed,
        }
    }
}
