use crate::checksum::iso13616_value;

const MODULUS: u32 = 97;

#[inline]
fn push_digit(remainder: u32, digit: u32) -> u32 {
    (remainder * 10 + digit) % MODULUS
}

/// Remainder modulo 97 of the number spelled by `chars`, letters expanded with
/// [iso13616_value].
///
/// The reduction consumes one decimal digit at a time, so it runs in constant
/// space whatever the length of the input. A letter contributes two digits.
pub fn mod97_chars(chars: impl IntoIterator<Item = char>) -> Option<u32> {
    let mut remainder = 0;
    let mut seen = false;
    for c in chars {
        let value = iso13616_value(c)?;
        remainder = if value < 10 {
            push_digit(remainder, value)
        } else {
            push_digit(push_digit(remainder, value / 10), value % 10)
        };
        seen = true;
    }
    seen.then_some(remainder)
}

/// [mod97_chars] over a string.
pub fn mod97(input: &str) -> Option<u32> {
    mod97_chars(input.chars())
}

/// ISO 7064 MOD 97-10 check digits for `payload`: the two digits that, appended
/// to it, make the whole number congruent to 1 modulo 97.
pub fn mod97_check_digits(payload: &str) -> Option<u32> {
    let remainder = mod97_chars(payload.chars().chain("00".chars()))?;
    Some(98 - remainder)
}
