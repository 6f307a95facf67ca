/// Running product of the ISO 7064 MOD 11,10 recursion over `payload`.
fn mod11_10_product(payload: &str) -> Option<u32> {
    let mut product = 10;
    for c in payload.chars() {
        let digit = c.to_digit(10)?;
        let mut sum = (digit + product) % 10;
        if sum == 0 {
            sum = 10;
        }
        product = (2 * sum) % 11;
    }
    Some(product)
}

/// ISO 7064 MOD 11,10 check digit for `payload`.
pub fn iso7064_mod11_10_check_digit(payload: &str) -> Option<u32> {
    if payload.is_empty() {
        return None;
    }
    mod11_10_product(payload).map(|product| (11 - product) % 10)
}

/// True if the last digit of `digits` is the ISO 7064 MOD 11,10 check digit of
/// the digits before it.
pub fn iso7064_mod11_10_is_valid(digits: &str) -> bool {
    let mut chars = digits.chars();
    let Some(check) = chars.next_back().and_then(|c| c.to_digit(10)) else {
        return false;
    };
    iso7064_mod11_10_check_digit(chars.as_str()) == Some(check)
}

#[cfg(test)]
mod test {
    use crate::checksum::*;
    use iso_iec_7064::{System, MOD_11_10};
    use proptest::prelude::*;

    #[test]
    fn test_valid_numbers() {
        let valid_numbers = vec![
            "15203607809",
            "26954371827",
            // German VAT number
            "136695976",
            // Croatian bank code and account number
            "1001005",
            "1863000160",
        ];
        for numbers in valid_numbers {
            println!("testing for input {}", numbers);
            assert!(iso7064_mod11_10_is_valid(numbers));
        }
    }

    #[test]
    fn test_invalid_numbers() {
        let invalid_numbers = vec![
            "30405607809",
            "15203607808",
            "1520360781",
            "",
            "5",
            "1520360780X",
        ];
        for numbers in invalid_numbers {
            println!("testing for input {}", numbers);
            assert!(!iso7064_mod11_10_is_valid(numbers));
        }
    }

    #[test]
    fn wrong_trailing_digit_is_rejected() {
        let payload = "1520360780";
        let check = iso7064_mod11_10_check_digit(payload).unwrap();
        assert_eq!(check, 9);
        for wrong in (0..10).filter(|d| *d != check) {
            assert!(!iso7064_mod11_10_is_valid(&format!("{payload}{wrong}")));
        }
    }

    proptest! {
        #[test]
        fn agrees_with_reference_mod_11_10(digits in "[0-9]{2,30}") {
            prop_assert_eq!(
                iso7064_mod11_10_is_valid(&digits),
                MOD_11_10.validate_string(&digits)
            );
        }
    }
}
