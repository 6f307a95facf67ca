//! IBAN and BBAN validation.
//!
//! An IBAN goes through four gates, and the first failure is reported:
//! 1. normalization, rejecting empty input
//! 2. country code, country support, total length and check digit range
//! 3. the country's BBAN layout
//! 4. the ISO 7064 MOD 97-10 checksum over the rearranged IBAN
//!
//! The layout is checked before the checksum so that a malformed account is
//! reported as such instead of as a checksum failure. Countries with domestic
//! check digits have those verified last.

mod details;
mod registry;

pub use details::{BbanDetails, IbanDetails};
pub use registry::{IbanCountrySpec, IbanRegistry};

use crate::checksum::{mod97_chars, CheckDigitScheme};
use crate::normalization::{is_country_code, normalize};
use crate::observability::metrics::ValidationMetrics;
use crate::validation::{ErrorCode, ValidationError, ValidationResult};
use registry::IBAN_PREFIX_LENGTH;

pub(crate) const IBAN_FAMILY: &str = "iban";
pub(crate) const BBAN_FAMILY: &str = "bban";

/// Validates `raw` against the built-in country formats.
pub fn validate_iban(raw: &str) -> ValidationResult {
    validate_iban_with(IbanRegistry::builtin(), raw)
}

pub fn validate_iban_with(registry: &IbanRegistry, raw: &str) -> ValidationResult {
    let result = check_iban(registry, &normalize(raw)).into();
    ValidationMetrics::new(IBAN_FAMILY).record(&result);
    result
}

/// Details of `raw` if it is a valid IBAN, `None` otherwise.
pub fn parse_iban(raw: &str) -> Option<IbanDetails> {
    parse_iban_with(IbanRegistry::builtin(), raw)
}

pub fn parse_iban_with(registry: &IbanRegistry, raw: &str) -> Option<IbanDetails> {
    let canonical = normalize(raw);
    let spec = check_iban(registry, &canonical).ok()?;
    Some(IbanDetails::new(&canonical, spec))
}

/// Validates a bare BBAN for `country`.
pub fn validate_bban(country: &str, raw: &str) -> ValidationResult {
    validate_bban_with(IbanRegistry::builtin(), country, raw)
}

pub fn validate_bban_with(registry: &IbanRegistry, country: &str, raw: &str) -> ValidationResult {
    let result = check_bban(registry, country, &normalize(raw)).into();
    ValidationMetrics::new(BBAN_FAMILY).record(&result);
    result
}

pub fn parse_bban(country: &str, raw: &str) -> Option<BbanDetails> {
    parse_bban_with(IbanRegistry::builtin(), country, raw)
}

pub fn parse_bban_with(registry: &IbanRegistry, country: &str, raw: &str) -> Option<BbanDetails> {
    let canonical = normalize(raw);
    let spec = check_bban(registry, country, &canonical).ok()?;
    Some(BbanDetails::new(&canonical, spec))
}

fn lookup<'r>(
    registry: &'r IbanRegistry,
    country: &str,
) -> Result<&'r IbanCountrySpec, ValidationError> {
    if !is_country_code(country) {
        return Err(ValidationError::new(
            ErrorCode::InvalidCountryCode,
            "country code must be two letters",
        ));
    }
    registry.get(country).ok_or_else(|| {
        ValidationError::new(
            ErrorCode::UnsupportedCountry,
            format!("no IBAN format is registered for {country}"),
        )
    })
}

fn check_iban<'r>(
    registry: &'r IbanRegistry,
    iban: &str,
) -> Result<&'r IbanCountrySpec, ValidationError> {
    if iban.is_empty() {
        return Err(ValidationError::new(ErrorCode::InvalidInput, "IBAN is empty"));
    }
    let spec = lookup(registry, iban.get(..2).unwrap_or(iban))?;
    if iban.len() != spec.length {
        return Err(ValidationError::new(
            ErrorCode::InvalidLength,
            format!(
                "{} IBANs have {} characters, found {}",
                spec.country_code,
                spec.length,
                iban.len()
            ),
        ));
    }

    let check_digits = &iban[2..IBAN_PREFIX_LENGTH];
    if !check_digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::new(
            ErrorCode::InvalidFormat,
            "check digits must be numeric",
        ));
    }
    if !("02"..="98").contains(&check_digits) {
        return Err(ValidationError::new(
            ErrorCode::InvalidCheckDigit,
            "check digits must be between 02 and 98",
        ));
    }

    let bban = &iban[IBAN_PREFIX_LENGTH..];
    spec.bban.check(bban)?;

    let rearranged = bban.chars().chain(iban[..IBAN_PREFIX_LENGTH].chars());
    if mod97_chars(rearranged) != Some(1) {
        return Err(ValidationError::new(
            ErrorCode::InvalidChecksum,
            "IBAN checksum does not match",
        ));
    }

    for check in &spec.national_checks {
        verify_national(check, bban)?;
    }
    Ok(spec)
}

fn check_bban<'r>(
    registry: &'r IbanRegistry,
    country: &str,
    bban: &str,
) -> Result<&'r IbanCountrySpec, ValidationError> {
    if bban.is_empty() {
        return Err(ValidationError::new(ErrorCode::InvalidInput, "BBAN is empty"));
    }
    let spec = lookup(registry, country)?;
    spec.bban.check(bban)?;
    for check in &spec.national_checks {
        verify_national(check, bban)?;
    }
    Ok(spec)
}

/// Domestic check digits fail as `InvalidCheckDigit`, whichever algorithm
/// computes them. `InvalidChecksum` stays reserved for the IBAN checksum.
fn verify_national(check: &CheckDigitScheme, bban: &str) -> Result<(), ValidationError> {
    check.verify(bban).map_err(|err| match err.code() {
        ErrorCode::InvalidChecksum => ValidationError::new(
            ErrorCode::InvalidCheckDigit,
            "national check digits do not match",
        ),
        _ => err,
    })
}

#[cfg(test)]
mod test {
    use crate::iban::*;
    use crate::validation::ErrorCode;
    use proptest::prelude::*;

    fn error_code(raw: &str) -> Option<ErrorCode> {
        validate_iban(raw).error_code()
    }

    const REGISTRY_EXAMPLES: &[&str] = &[
        "AD1200012030200359100100",
        "AE070331234567890123456",
        "AT611904300234573201",
        "BE68539007547034",
        "BG80BNBG96611020345678",
        "BR9700360305000010009795493P1",
        "CH9300762011623852957",
        "CY17002001280000001200527600",
        "CZ6508000000192000145399",
        "DE89370400440532013000",
        "DK5000400440116243",
        "EE382200221020145685",
        "ES9121000418450200051332",
        "FI2112345600000785",
        "FR1420041010050500013M02606",
        "GB29NWBK60161331926819",
        "GR1601101250000000012300695",
        "HR1210010051863000160",
        "HU42117730161111101800000000",
        "IE29AIBK93115212345678",
        "IL620108000000099999999",
        "IS140159260076545510730339",
        "IT60X0542811101000000123456",
        "KZ86125KZT5004100100",
        "LI21088100002324013AA",
        "LT121000011101001000",
        "LU280019400644750000",
        "LV80BANK0000435195001",
        "MC5811222000010123456789030",
        "MT84MALT011000012345MTLCAST001S",
        "NL91ABNA0417164300",
        "NO9386011117947",
        "PL61109010140000071219812874",
        "PT50000201231234567890154",
        "RO49AAAA1B31007593840000",
        "SA0380000000608010167519",
        "SE4550000000058398257466",
        "SI56263300012039086",
        "SK3112000000198742637541",
        "SM86U0322509800000000270100",
        "TR330006100519786457841326",
    ];

    #[test]
    fn test_valid_ibans() {
        for iban in REGISTRY_EXAMPLES {
            println!("testing for input {iban}");
            assert!(validate_iban(iban).is_valid());
        }
    }

    #[test]
    fn reference_vector_end_to_end() {
        assert!(validate_iban("GB82WEST12345698765432").is_valid());
        assert!(validate_iban("GB82 WEST 1234 5698 7654 32").is_valid());
        assert!(validate_iban("gb82-west-1234-5698-7654-32").is_valid());
        assert!(validate_iban("DE4450-0105-1754-0732-4931").is_valid());
        assert!(validate_iban("KZ86 125K ZT50 0410 0100").is_valid());
    }

    #[test]
    fn agrees_with_reference_implementation() {
        let mut inputs: Vec<String> = REGISTRY_EXAMPLES.iter().map(|s| s.to_string()).collect();
        inputs.push("DE45500105175407324931".to_string());
        inputs.push("GB82WEST12345698765433".to_string());
        for input in inputs {
            assert_eq!(
                validate_iban(&input).is_valid(),
                input.parse::<::iban::Iban>().is_ok(),
                "{input}"
            );
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(error_code(""), Some(ErrorCode::InvalidInput));
        assert_eq!(error_code(" -/ "), Some(ErrorCode::InvalidInput));
    }

    #[test]
    fn country_code_errors() {
        assert_eq!(error_code("1282WEST12345698765432"), Some(ErrorCode::InvalidCountryCode));
        assert_eq!(error_code("G"), Some(ErrorCode::InvalidCountryCode));
        assert_eq!(error_code("XX82WEST12345698765432"), Some(ErrorCode::UnsupportedCountry));
        assert_eq!(error_code("AL84212110090000AB023569874"), Some(ErrorCode::UnsupportedCountry));
    }

    #[test]
    fn length_errors() {
        assert_eq!(error_code("GB82WEST1234569876543"), Some(ErrorCode::InvalidLength));
        assert_eq!(error_code("GB82WEST123456987654321"), Some(ErrorCode::InvalidLength));
        assert_eq!(error_code("GB"), Some(ErrorCode::InvalidLength));
    }

    #[test]
    fn check_digit_errors() {
        assert_eq!(error_code("GBX2WEST12345698765432"), Some(ErrorCode::InvalidFormat));
        assert_eq!(error_code("GB00WEST12345698765432"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("GB01WEST12345698765432"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("GB99WEST12345698765432"), Some(ErrorCode::InvalidCheckDigit));
    }

    #[test]
    fn structure_is_checked_before_checksum() {
        // letters where the sort code should be, and a wrong checksum on top
        let err = validate_iban("GB82WEST1234AB98765432");
        assert_eq!(err.error_code(), Some(ErrorCode::InvalidFormat));
        assert_eq!(
            err.errors()[0].message(),
            "segment 2 (positions 5-10) must contain only digits"
        );
        assert_eq!(error_code("GB82WE5T12345698765432"), Some(ErrorCode::InvalidFormat));
    }

    #[test]
    fn checksum_errors() {
        assert_eq!(error_code("GB82WEST12345698765433"), Some(ErrorCode::InvalidChecksum));
        assert_eq!(error_code("DE45500105175407324931"), Some(ErrorCode::InvalidChecksum));
        assert_eq!(error_code("GB28WEST12345698765432"), Some(ErrorCode::InvalidChecksum));
    }

    #[test]
    fn national_check_digits() {
        // each of these has a correct IBAN checksum but a wrong domestic check digit
        assert_eq!(error_code("BE41539007547035"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("ES2921000418460200051332"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("FI9112345600000786"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("HR8210010051863000161"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("NO6686011117948"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("PL36109010150000071219812874"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("SI29263300012039087"), Some(ErrorCode::InvalidCheckDigit));
    }

    #[test]
    fn forbidden_national_remainder() {
        // the Norwegian account 8601111705 weighs to remainder 1, which no account can have
        assert_eq!(error_code("NO6286011117050"), Some(ErrorCode::InvalidIdentifier));
    }

    #[test]
    fn parse_valid_iban() {
        let details = parse_iban("GB82 WEST 1234 5698 7654 32").unwrap();
        assert_eq!(details.country_code(), "GB");
        assert_eq!(details.check_digits(), "82");
        assert_eq!(details.bban().bban(), "WEST12345698765432");
        assert_eq!(details.bban().bank_code(), "WEST");
        assert_eq!(details.bban().branch_code(), Some("123456"));
        assert_eq!(details.bban().account_number(), "98765432");
        assert_eq!(details.electronic_format(), "GB82WEST12345698765432");
        assert_eq!(details.print_format(), "GB82 WEST 1234 5698 7654 32");
        assert_eq!(details.to_string(), "GB82 WEST 1234 5698 7654 32");

        let details = parse_iban("DE89370400440532013000").unwrap();
        assert_eq!(details.bban().bank_code(), "37040044");
        assert_eq!(details.bban().branch_code(), None);
        assert_eq!(details.bban().account_number(), "0532013000");

        let details = parse_iban("IT60X0542811101000000123456").unwrap();
        assert_eq!(details.bban().bank_code(), "05428");
        assert_eq!(details.bban().branch_code(), Some("11101"));
    }

    #[test]
    fn parse_invalid_iban() {
        assert_eq!(parse_iban(""), None);
        assert_eq!(parse_iban("GB82WEST12345698765433"), None);
        assert_eq!(parse_iban("XX82WEST12345698765432"), None);
    }

    #[test]
    fn parse_and_validate_agree() {
        let inputs = [
            "GB82WEST12345698765432",
            "GB82WEST12345698765433",
            "GB82WEST1234AB98765432",
            "NO6286011117050",
            "BE41539007547035",
            "",
            "G",
            "GB00WEST12345698765432",
        ];
        for input in REGISTRY_EXAMPLES.iter().chain(inputs.iter()) {
            assert_eq!(
                parse_iban(input).is_some(),
                validate_iban(input).is_valid(),
                "{input}"
            );
        }
    }

    #[test]
    fn bban_validation() {
        assert!(validate_bban("GB", "WEST 1234 5698 7654 32").is_valid());
        assert!(validate_bban("ES", "2100 0418 45 0200051332").is_valid());
        assert_eq!(
            validate_bban("ES", "2100 0418 46 0200051332").error_code(),
            Some(ErrorCode::InvalidCheckDigit)
        );
        assert_eq!(
            validate_bban("GB", "WEST1234569876543").error_code(),
            Some(ErrorCode::InvalidLength)
        );
        assert_eq!(
            validate_bban("XX", "WEST12345698765432").error_code(),
            Some(ErrorCode::UnsupportedCountry)
        );
        assert_eq!(
            validate_bban("gb", "WEST12345698765432").error_code(),
            Some(ErrorCode::InvalidCountryCode)
        );
        assert_eq!(validate_bban("GB", "").error_code(), Some(ErrorCode::InvalidInput));
        assert!(validate_bban("FI", "123456 00000785").is_valid());
        assert_eq!(
            validate_bban("FI", "123456 00000786").error_code(),
            Some(ErrorCode::InvalidCheckDigit)
        );

        let details = parse_bban("FR", "20041 01005 0500013M026 06").unwrap();
        assert_eq!(details.bank_code(), "20041");
        assert_eq!(details.branch_code(), Some("01005"));
        assert_eq!(details.account_number(), "0500013M026");
        assert_eq!(parse_bban("FR", "20041"), None);
    }

    #[test]
    fn custom_registry_adds_a_country() {
        let specs: Vec<IbanCountrySpec> = serde_json::from_str(
            r#"[{
                "country_code": "XK",
                "length": 20,
                "bban": "4!n10!n2!n",
                "bank_code": {"start": 0, "end": 4},
                "account_number": {"start": 4, "end": 14}
            }]"#,
        )
        .unwrap();
        let registry = IbanRegistry::new(specs).unwrap();
        assert!(validate_iban_with(&registry, "XK051212012345678906").is_valid());
        assert_eq!(
            validate_iban_with(&registry, "GB82WEST12345698765432").error_code(),
            Some(ErrorCode::UnsupportedCountry)
        );
        let details = parse_iban_with(&registry, "XK051212012345678906").unwrap();
        assert_eq!(details.bban().bank_code(), "1212");
    }

    proptest! {
        #[test]
        fn arbitrary_input_follows_the_contract(raw in "\\PC{0,40}") {
            prop_assert_eq!(parse_iban(&raw).is_some(), validate_iban(&raw).is_valid());
        }

        #[test]
        fn iban_shaped_input_agrees_with_reference(raw in "(DE|GB|FR|NL)[0-9]{2}[A-Z0-9]{14,23}") {
            let reference = raw.parse::<::iban::Iban>().is_ok();
            let ours = validate_iban(&raw).is_valid();
            // domestic check digits can only make this crate stricter
            prop_assert!(reference || !ours);
        }
    }
}
