use std::ops::Range;

use ahash::AHashMap;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::checksum::{CheckDigitScheme, CheckValue, Mod11Rule, TenPolicy};
use crate::error::RegistryError;
use crate::normalization::is_country_code;
use crate::structure::{LayoutParseError, SegmentLayout};

/// Country code plus check digits.
pub(crate) const IBAN_PREFIX_LENGTH: usize = 4;

/// Everything the IBAN engine needs to know about one country.
///
/// Ranges are positions inside the BBAN, not inside the full IBAN.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbanCountrySpec {
    pub country_code: String,
    pub length: usize,
    pub bban: SegmentLayout,
    pub bank_code: Range<usize>,
    #[serde(default)]
    pub branch_code: Option<Range<usize>>,
    pub account_number: Range<usize>,
    /// Domestic check digits verified once the IBAN checksum holds.
    #[serde(default)]
    pub national_checks: Vec<CheckDigitScheme>,
}

impl IbanCountrySpec {
    pub fn bban_length(&self) -> usize {
        self.bban.total_length()
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let country = &self.country_code;
        if !is_country_code(country) {
            return Err(RegistryError::InvalidCountryCode(country.clone()));
        }
        let bban_length = self.bban_length();
        let computed = IBAN_PREFIX_LENGTH.checked_add(bban_length).ok_or_else(|| {
            RegistryError::InvalidLayout {
                country: country.clone(),
                source: LayoutParseError::TooLong,
            }
        })?;
        if self.length != computed {
            return Err(RegistryError::LengthMismatch {
                country: country.clone(),
                declared: self.length,
                computed,
            });
        }
        let ranges = [
            Some(&self.bank_code),
            self.branch_code.as_ref(),
            Some(&self.account_number),
        ];
        for range in ranges.into_iter().flatten() {
            if range.is_empty() || range.end > bban_length {
                return Err(RegistryError::RangeOutOfBounds {
                    country: country.clone(),
                    end: range.end,
                    length: bban_length,
                });
            }
        }
        for check in &self.national_checks {
            check.check_table(country, bban_length)?;
        }
        Ok(())
    }
}

/// Country code to [IbanCountrySpec] lookup.
///
/// Adding a country is a matter of adding a spec: the engine has no per-country code.
#[derive(Clone, Debug)]
pub struct IbanRegistry {
    countries: AHashMap<String, IbanCountrySpec>,
}

impl IbanRegistry {
    pub fn new(specs: impl IntoIterator<Item = IbanCountrySpec>) -> Result<Self, RegistryError> {
        let mut countries = AHashMap::new();
        for spec in specs {
            spec.validate()?;
            let country = spec.country_code.clone();
            if countries.insert(country.clone(), spec).is_some() {
                return Err(RegistryError::DuplicateCountry(country));
            }
        }
        Ok(Self { countries })
    }

    /// The formats shipped with this crate.
    pub fn builtin() -> &'static IbanRegistry {
        &BUILTIN_IBAN_REGISTRY
    }

    pub fn get(&self, country: &str) -> Option<&IbanCountrySpec> {
        self.countries.get(country)
    }

    pub fn countries(&self) -> impl Iterator<Item = &IbanCountrySpec> {
        self.countries.values()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

lazy_static! {
    static ref BUILTIN_IBAN_REGISTRY: IbanRegistry = builtin_specs()
        .and_then(IbanRegistry::new)
        .expect("built-in IBAN formats are consistent");
}

type FormatRow = (
    &'static str,
    usize,
    &'static str,
    Range<usize>,
    Option<Range<usize>>,
    Range<usize>,
);

// country, IBAN length, BBAN layout, bank code, branch code, account number
// source: SWIFT IBAN registry
const IBAN_FORMATS: &[FormatRow] = &[
    ("AD", 24, "4!n4!n12!c", 0..4, Some(4..8), 8..20),
    ("AE", 23, "3!n16!n", 0..3, None, 3..19),
    ("AT", 20, "5!n11!n", 0..5, None, 5..16),
    ("BE", 16, "3!n7!n2!n", 0..3, None, 3..12),
    ("BG", 22, "4!a4!n2!n8!c", 0..4, Some(4..8), 10..18),
    ("BR", 29, "8!n5!n10!n1!a1!c", 0..8, Some(8..13), 13..23),
    ("CH", 21, "5!n12!c", 0..5, None, 5..17),
    ("CY", 28, "3!n5!n16!c", 0..3, Some(3..8), 8..24),
    ("CZ", 24, "4!n6!n10!n", 0..4, None, 4..20),
    ("DE", 22, "8!n10!n", 0..8, None, 8..18),
    ("DK", 18, "4!n9!n1!n", 0..4, None, 4..14),
    ("EE", 20, "2!n2!n11!n1!n", 0..2, Some(2..4), 4..16),
    ("ES", 24, "4!n4!n1!n1!n10!n", 0..4, Some(4..8), 10..20),
    ("FI", 18, "3!n11!n", 0..3, None, 3..14),
    ("FR", 27, "5!n5!n11!c2!n", 0..5, Some(5..10), 10..21),
    ("GB", 22, "4!a6!n8!n", 0..4, Some(4..10), 10..18),
    ("GR", 27, "3!n4!n16!c", 0..3, Some(3..7), 7..23),
    ("HR", 21, "7!n10!n", 0..7, None, 7..17),
    ("HU", 28, "3!n4!n1!n15!n1!n", 0..3, Some(3..7), 8..24),
    ("IE", 22, "4!a6!n8!n", 0..4, Some(4..10), 10..18),
    ("IL", 23, "3!n3!n13!n", 0..3, Some(3..6), 6..19),
    ("IS", 26, "4!n2!n6!n10!n", 0..2, Some(2..4), 4..12),
    ("IT", 27, "1!a5!n5!n12!c", 1..6, Some(6..11), 11..23),
    ("KZ", 20, "3!n13!c", 0..3, None, 3..16),
    ("LI", 21, "5!n12!c", 0..5, None, 5..17),
    ("LT", 20, "5!n11!n", 0..5, None, 5..16),
    ("LU", 20, "3!n13!c", 0..3, None, 3..16),
    ("LV", 21, "4!a13!c", 0..4, None, 4..17),
    ("MC", 27, "5!n5!n11!c2!n", 0..5, Some(5..10), 10..21),
    ("MT", 31, "4!a5!n18!c", 0..4, Some(4..9), 9..27),
    ("NL", 18, "4!a10!n", 0..4, None, 4..14),
    ("NO", 15, "4!n6!n1!n", 0..4, None, 4..11),
    ("PL", 28, "8!n16!n", 0..8, None, 8..24),
    ("PT", 25, "4!n4!n11!n2!n", 0..4, Some(4..8), 8..19),
    ("RO", 24, "4!a16!c", 0..4, None, 4..20),
    ("SA", 24, "2!n18!c", 0..2, None, 2..20),
    ("SE", 24, "3!n16!n1!n", 0..3, None, 3..20),
    ("SI", 19, "5!n8!n2!n", 0..5, None, 5..15),
    ("SK", 24, "4!n6!n10!n", 0..4, None, 4..20),
    ("SM", 27, "1!a5!n5!n12!c", 1..6, Some(6..11), 11..23),
    ("TR", 26, "5!n1!n16!c", 0..5, None, 6..22),
];

/// Domestic check digits inside the BBAN. Countries not listed here are only
/// checked through the IBAN checksum; the French RIB key and the Italian CIN in
/// particular are not verified.
fn national_checks(country: &str) -> Vec<CheckDigitScheme> {
    match country {
        "BE" => vec![CheckDigitScheme::Mod97Remainder {
            payload: 0..10,
            check: 10..12,
        }],
        "ES" => vec![
            // bank and branch, read with two leading zeros whose weights drop out
            CheckDigitScheme::Mod11 {
                payload: 0..8,
                check: 8,
                rule: Mod11Rule::new(
                    vec![4, 8, 5, 10, 9, 7, 3, 6],
                    CheckValue::Complement,
                    TenPolicy::One,
                ),
            },
            CheckDigitScheme::Mod11 {
                payload: 10..20,
                check: 9,
                rule: Mod11Rule::new(
                    vec![1, 2, 4, 8, 5, 10, 9, 7, 3, 6],
                    CheckValue::Complement,
                    TenPolicy::One,
                ),
            },
        ],
        "FI" => vec![CheckDigitScheme::Luhn { range: 0..14 }],
        "HR" => vec![
            CheckDigitScheme::Iso7064Mod11_10 { range: 0..7 },
            CheckDigitScheme::Iso7064Mod11_10 { range: 7..17 },
        ],
        "NO" => vec![CheckDigitScheme::Mod11 {
            payload: 0..10,
            check: 10,
            rule: Mod11Rule::new(
                vec![5, 4, 3, 2, 7, 6, 5, 4, 3, 2],
                CheckValue::Complement,
                TenPolicy::Forbidden,
            ),
        }],
        "PL" => vec![CheckDigitScheme::WeightedMod10 {
            range: 0..8,
            weights: vec![3, 9, 7, 1, 3, 9, 7, 1],
        }],
        "SI" => vec![CheckDigitScheme::Mod97 { range: 0..15 }],
        _ => vec![],
    }
}

fn builtin_specs() -> Result<Vec<IbanCountrySpec>, RegistryError> {
    IBAN_FORMATS
        .iter()
        .map(|(country, length, layout, bank, branch, account)| {
            Ok(IbanCountrySpec {
                country_code: country.to_string(),
                length: *length,
                bban: layout
                    .parse::<SegmentLayout>()
                    .map_err(|source| RegistryError::InvalidLayout {
                        country: country.to_string(),
                        source,
                    })?,
                bank_code: bank.clone(),
                branch_code: branch.clone(),
                account_number: account.clone(),
                national_checks: national_checks(country),
            })
        })
        .collect()
}
