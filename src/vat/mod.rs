//! EU VAT identification numbers.
//!
//! A VAT number is a two-letter country prefix followed by a national body. The
//! body is matched against one of the country's layouts (picked by length), its
//! fixed literals, and finally its check-digit scheme.

mod registry;

pub use registry::{VatCountrySpec, VatLiteral, VatRegistry};

use serde::Serialize;

use crate::normalization::{is_country_code, normalize, strip_country_prefix};
use crate::observability::metrics::ValidationMetrics;
use crate::validation::{ErrorCode, ValidationError, ValidationResult};

pub(crate) const VAT_FAMILY: &str = "vat";

const PREFIX_LENGTH: usize = 2;

/// A validated VAT number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VatDetails {
    country_code: String,
    number: String,
}

impl VatDetails {
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// The national number, without the country prefix.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Prefix and number, as printed on invoices.
    pub fn formatted(&self) -> String {
        format!("{}{}", self.country_code, self.number)
    }
}

/// Validates a VAT number carrying its country prefix, e.g. `DE136695976`.
pub fn validate_vat(raw: &str) -> ValidationResult {
    validate_vat_with(VatRegistry::builtin(), raw)
}

pub fn validate_vat_with(registry: &VatRegistry, raw: &str) -> ValidationResult {
    let canonical = normalize(raw);
    let result = check_prefixed(registry, &canonical).into();
    ValidationMetrics::new(VAT_FAMILY).record(&result);
    result
}

/// Validates a VAT number of a known country. The country prefix is optional.
pub fn validate_vat_for_country(country: &str, raw: &str) -> ValidationResult {
    validate_vat_for_country_with(VatRegistry::builtin(), country, raw)
}

pub fn validate_vat_for_country_with(
    registry: &VatRegistry,
    country: &str,
    raw: &str,
) -> ValidationResult {
    let canonical = normalize(raw);
    let result = check_for_country(registry, country, &canonical).into();
    ValidationMetrics::new(VAT_FAMILY).record(&result);
    result
}

pub fn parse_vat(raw: &str) -> Option<VatDetails> {
    parse_vat_with(VatRegistry::builtin(), raw)
}

pub fn parse_vat_with(registry: &VatRegistry, raw: &str) -> Option<VatDetails> {
    let canonical = normalize(raw);
    check_prefixed(registry, &canonical).ok()
}

pub fn parse_vat_for_country(country: &str, raw: &str) -> Option<VatDetails> {
    parse_vat_for_country_with(VatRegistry::builtin(), country, raw)
}

pub fn parse_vat_for_country_with(
    registry: &VatRegistry,
    country: &str,
    raw: &str,
) -> Option<VatDetails> {
    let canonical = normalize(raw);
    check_for_country(registry, country, &canonical).ok()
}

fn lookup<'r>(
    registry: &'r VatRegistry,
    country: &str,
) -> Result<&'r VatCountrySpec, ValidationError> {
    if !is_country_code(country) {
        return Err(ValidationError::new(
            ErrorCode::InvalidCountryCode,
            "VAT numbers start with a two-letter country code",
        ));
    }
    registry.get(country).ok_or_else(|| {
        ValidationError::new(
            ErrorCode::UnsupportedCountry,
            format!("no VAT format is registered for {country}"),
        )
    })
}

fn check_prefixed(
    registry: &VatRegistry,
    canonical: &str,
) -> Result<VatDetails, ValidationError> {
    if canonical.is_empty() {
        return Err(ValidationError::new(ErrorCode::InvalidInput, "VAT number is empty"));
    }
    let country = canonical.get(..PREFIX_LENGTH).unwrap_or(canonical);
    let spec = lookup(registry, country)?;
    check_body(spec, &canonical[PREFIX_LENGTH..])
}

fn check_for_country(
    registry: &VatRegistry,
    country: &str,
    canonical: &str,
) -> Result<VatDetails, ValidationError> {
    let spec = lookup(registry, country)?;
    check_body(spec, strip_country_prefix(canonical, country))
}

fn check_body(spec: &VatCountrySpec, body: &str) -> Result<VatDetails, ValidationError> {
    if body.is_empty() {
        return Err(ValidationError::new(ErrorCode::InvalidInput, "VAT number is empty"));
    }
    let layout = spec.layout_for(body.len()).ok_or_else(|| {
        let lengths: Vec<String> = spec.lengths().iter().map(usize::to_string).collect();
        ValidationError::new(
            ErrorCode::InvalidLength,
            format!(
                "{} VAT numbers have {} characters after the prefix, found {}",
                spec.country_code,
                lengths.join(" or "),
                body.len()
            ),
        )
    })?;
    layout.check(body)?;

    for literal in &spec.literals {
        let found = body.get(literal.offset..literal.offset + literal.text.len());
        if found != Some(literal.text.as_str()) {
            return Err(ValidationError::new(
                ErrorCode::InvalidFormat,
                format!(
                    "expected `{}` at position {}",
                    literal.text,
                    literal.offset + 1
                ),
            ));
        }
    }

    spec.scheme.verify(body)?;
    Ok(VatDetails {
        country_code: spec.country_code.clone(),
        number: body.to_owned(),
    })
}

#[cfg(test)]
mod test {
    use crate::validation::ErrorCode;
    use crate::vat::*;

    fn error_code(raw: &str) -> Option<ErrorCode> {
        validate_vat(raw).error_code()
    }

    const VALID: &[&str] = &[
        "ATU13585627",
        "ATU10223006",
        "BE0776091951",
        "DE136695976",
        "DK13585628",
        "FI20774740",
        "FR40303265045",
        "IE6433435F",
        "IE3628739L",
        "IE3628739UA",
        "IT00743110157",
        "NL004495445B01",
        "PL8567346215",
        "PL5260250995",
        "PT501964843",
        "SE556188840401",
    ];

    #[test]
    fn test_valid_vat_numbers() {
        for vat in VALID {
            println!("testing for input {vat}");
            assert!(validate_vat(vat).is_valid());
        }
    }

    #[test]
    fn separators_and_case_are_ignored() {
        assert!(validate_vat("de 136 695 976").is_valid());
        assert!(validate_vat("NL.0044.95.445.B.01").is_valid());
        assert!(validate_vat("fr 40 303 265 045").is_valid());
    }

    #[test]
    fn checksum_failures() {
        assert_eq!(error_code("DE136695975"), Some(ErrorCode::InvalidChecksum));
        assert_eq!(error_code("IT00743110158"), Some(ErrorCode::InvalidChecksum));
        assert_eq!(error_code("SE556188840501"), Some(ErrorCode::InvalidChecksum));
        assert_eq!(error_code("PL8567346216"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("DK13585629"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("PT501964842"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("ATU13585628"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("BE0776091952"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("FR41303265045"), Some(ErrorCode::InvalidCheckDigit));
        assert_eq!(error_code("IE6433435G"), Some(ErrorCode::InvalidCheckDigit));
    }

    #[test]
    fn irish_trailing_letter() {
        assert!(validate_vat("IE1234567TW").is_valid());
        assert!(validate_vat("IE3628739UA").is_valid());
        // J to Z carry no value, even where the sum would otherwise match
        assert_eq!(error_code("IE3628739JX"), Some(ErrorCode::InvalidFormat));
        assert_eq!(error_code("IE3628739LZ"), Some(ErrorCode::InvalidFormat));
    }

    #[test]
    fn forbidden_remainders() {
        for check in '0'..='9' {
            assert_eq!(
                error_code(&format!("PL123456789{check}")),
                Some(ErrorCode::InvalidIdentifier)
            );
            assert_eq!(
                error_code(&format!("FI1000008{check}")),
                Some(ErrorCode::InvalidIdentifier)
            );
            assert_eq!(
                error_code(&format!("DK1000005{check}")),
                Some(ErrorCode::InvalidIdentifier)
            );
            assert_eq!(
                error_code(&format!("NL10000006{check}B01")),
                Some(ErrorCode::InvalidIdentifier)
            );
        }
    }

    #[test]
    fn french_letter_keys_are_not_verified() {
        assert!(validate_vat("FRAB303265045").is_valid());
        assert_eq!(error_code("FRAB30326504X"), Some(ErrorCode::InvalidFormat));
    }

    #[test]
    fn literals() {
        let err = validate_vat("NL004495445A01");
        assert_eq!(err.error_code(), Some(ErrorCode::InvalidFormat));
        assert_eq!(err.errors()[0].message(), "expected `B` at position 10");
        assert_eq!(error_code("SE556188840402"), Some(ErrorCode::InvalidFormat));
        assert_eq!(error_code("AT113585627"), Some(ErrorCode::InvalidFormat));
    }

    #[test]
    fn structural_failures() {
        assert_eq!(error_code(""), Some(ErrorCode::InvalidInput));
        assert_eq!(error_code("DE"), Some(ErrorCode::InvalidInput));
        assert_eq!(error_code("D"), Some(ErrorCode::InvalidCountryCode));
        assert_eq!(error_code("12136695976"), Some(ErrorCode::InvalidCountryCode));
        assert_eq!(error_code("GB123456789"), Some(ErrorCode::UnsupportedCountry));
        assert_eq!(error_code("DE13669597"), Some(ErrorCode::InvalidLength));
        assert_eq!(error_code("DE13669597A"), Some(ErrorCode::InvalidFormat));

        let err = validate_vat("IE6433435");
        assert_eq!(err.error_code(), Some(ErrorCode::InvalidLength));
        assert_eq!(
            err.errors()[0].message(),
            "IE VAT numbers have 8 or 9 characters after the prefix, found 7"
        );
    }

    #[test]
    fn known_country() {
        assert!(validate_vat_for_country("DE", "136695976").is_valid());
        assert!(validate_vat_for_country("DE", "DE 136695976").is_valid());
        assert_eq!(
            validate_vat_for_country("DE", "136695975").error_code(),
            Some(ErrorCode::InvalidChecksum)
        );
        assert_eq!(
            validate_vat_for_country("DE", "").error_code(),
            Some(ErrorCode::InvalidInput)
        );
        assert_eq!(
            validate_vat_for_country("de", "136695976").error_code(),
            Some(ErrorCode::InvalidCountryCode)
        );
        assert_eq!(
            validate_vat_for_country("XX", "136695976").error_code(),
            Some(ErrorCode::UnsupportedCountry)
        );
    }

    #[test]
    fn parse_details() {
        let details = parse_vat("NL 0044 95 445 B01").unwrap();
        assert_eq!(details.country_code(), "NL");
        assert_eq!(details.number(), "004495445B01");
        assert_eq!(details.formatted(), "NL004495445B01");

        let details = parse_vat_for_country("AT", "U13585627").unwrap();
        assert_eq!(details.formatted(), "ATU13585627");

        assert_eq!(parse_vat("DE136695975"), None);
        assert_eq!(parse_vat_for_country("AT", "U13585628"), None);
    }

    #[test]
    fn parse_and_validate_agree() {
        let invalid = ["", "DE", "DE136695975", "NL004495445A01", "PL1234567890", "XX123"];
        for input in VALID.iter().chain(invalid.iter()) {
            assert_eq!(
                parse_vat(input).is_some(),
                validate_vat(input).is_valid(),
                "{input}"
            );
        }
    }

    #[test]
    fn custom_registry() {
        let specs: Vec<VatCountrySpec> = serde_json::from_str(
            r#"[{
                "country_code": "XA",
                "layouts": ["6!n"],
                "scheme": {"type": "luhn", "range": {"start": 0, "end": 6}}
            }]"#,
        )
        .unwrap();
        let registry = VatRegistry::new(specs).unwrap();
        assert!(validate_vat_with(&registry, "XA123455").is_valid());
        assert_eq!(
            validate_vat_with(&registry, "XA123456").error_code(),
            Some(ErrorCode::InvalidChecksum)
        );
        assert!(validate_vat_for_country_with(&registry, "XA", "123455").is_valid());
        assert_eq!(
            parse_vat_for_country_with(&registry, "XA", "XA123455").map(|d| d.formatted()),
            Some("XA123455".to_string())
        );
        assert_eq!(parse_vat_with(&registry, "DE136695976"), None);
    }
}
