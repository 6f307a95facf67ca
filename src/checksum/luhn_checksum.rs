/// Sum of the Luhn transformation, reading `digits` from the right and doubling
/// every second digit starting with the rightmost one when `double_first` is set.
fn luhn_sum(digits: &str, double_first: bool) -> Option<u32> {
    let mut sum: u32 = 0;
    let mut double = double_first;
    for c in digits.chars().rev() {
        let digit = c.to_digit(10)?;
        if double {
            let doubled = digit * 2;
            sum += if doubled > 9 { doubled - 9 } else { doubled };
        } else {
            sum += digit;
        }
        double = !double;
    }
    Some(sum)
}

/// Mod 10 check over a digit string whose last digit is the check digit.
pub fn luhn_is_valid(digits: &str) -> bool {
    if digits.len() < 2 {
        return false;
    }
    matches!(luhn_sum(digits, false), Some(sum) if sum % 10 == 0)
}

/// Digit to append to `payload` so that the result passes [luhn_is_valid].
pub fn luhn_check_digit(payload: &str) -> Option<u32> {
    if payload.is_empty() {
        return None;
    }
    luhn_sum(payload, true).map(|sum| (10 - sum % 10) % 10)
}
