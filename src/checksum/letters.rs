/// ISO 13616 numeral value: digits map to themselves, `A` to 10 up to `Z` at 35.
///
/// This is the mapping used before a modulo-97 reduction (IBAN, RF creditor
/// references). Only upper-case ASCII letters are accepted.
pub fn iso13616_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
        _ => None,
    }
}

/// Position of an upper-case ASCII letter in the alphabet, `A` = 1 up to `Z` = 26.
///
/// Digits have no position. Not interchangeable with [iso13616_value].
pub fn alphabet_position(c: char) -> Option<u32> {
    match c {
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 1),
        _ => None,
    }
}
