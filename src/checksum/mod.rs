//! Numeric check-digit primitives.
//!
//! Every function here is total over its input: characters outside the expected
//! alphabet produce a failure value (`None`, `false` or an outcome variant)
//! instead of a panic. Only violations of a documented precondition panic.

mod iso_7064_checksum;
mod letters;
mod luhn_checksum;
mod mod11_checksum;
mod mod97_checksum;
mod scheme;

pub use iso_7064_checksum::{iso7064_mod11_10_check_digit, iso7064_mod11_10_is_valid};
pub use letters::{alphabet_position, iso13616_value};
pub use luhn_checksum::{luhn_check_digit, luhn_is_valid};
pub use mod11_checksum::{weighted_sum, CheckValue, Mod11Outcome, Mod11Rule, TenPolicy};
pub use mod97_checksum::{mod97, mod97_chars, mod97_check_digits};
pub use scheme::{CheckDigitScheme, MAX_MOD97_CHECK_WIDTH, MAX_WEIGHT};

/// Decimal values of `digits`, `None` as soon as a non-digit shows up.
fn digit_values(digits: &str) -> Option<Vec<u32>> {
    digits.chars().map(|c| c.to_digit(10)).collect()
}
