use ahash::AHashMap;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::checksum::{CheckDigitScheme, CheckValue, Mod11Rule, TenPolicy};
use crate::error::RegistryError;
use crate::normalization::is_country_code;
use crate::structure::SegmentLayout;

/// Fixed text at a fixed position of a VAT number, such as the `B` of a Dutch number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatLiteral {
    pub offset: usize,
    pub text: String,
}

impl VatLiteral {
    pub fn new(offset: usize, text: &str) -> Self {
        VatLiteral {
            offset,
            text: text.to_owned(),
        }
    }

    fn end(&self) -> usize {
        self.offset.saturating_add(self.text.len())
    }
}

/// Shape and check digit of the VAT numbers of one country, without the prefix.
///
/// A country may accept several layouts as long as their lengths differ; the
/// length of the input picks the layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatCountrySpec {
    pub country_code: String,
    pub layouts: Vec<SegmentLayout>,
    #[serde(default)]
    pub literals: Vec<VatLiteral>,
    pub scheme: CheckDigitScheme,
}

impl VatCountrySpec {
    pub(crate) fn layout_for(&self, length: usize) -> Option<&SegmentLayout> {
        self.layouts
            .iter()
            .find(|layout| layout.total_length() == length)
    }

    pub(crate) fn lengths(&self) -> Vec<usize> {
        self.layouts.iter().map(SegmentLayout::total_length).collect()
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let country = &self.country_code;
        if !is_country_code(country) {
            return Err(RegistryError::InvalidCountryCode(country.clone()));
        }
        let shortest = self
            .layouts
            .iter()
            .map(SegmentLayout::total_length)
            .min()
            .ok_or_else(|| RegistryError::MissingLayout(country.clone()))?;

        self.scheme.check_table(country, shortest)?;
        if let Some(literal) = self.literals.iter().find(|l| l.end() > shortest) {
            return Err(RegistryError::RangeOutOfBounds {
                country: country.clone(),
                end: literal.end(),
                length: shortest,
            });
        }
        Ok(())
    }
}

/// Country code to [VatCountrySpec] lookup.
#[derive(Clone, Debug)]
pub struct VatRegistry {
    countries: AHashMap<String, VatCountrySpec>,
}

impl VatRegistry {
    pub fn new(specs: impl IntoIterator<Item = VatCountrySpec>) -> Result<Self, RegistryError> {
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

    pub fn builtin() -> &'static VatRegistry {
        &BUILTIN_VAT_REGISTRY
    }

    pub fn get(&self, country: &str) -> Option<&VatCountrySpec> {
        self.countries.get(country)
    }

    pub fn countries(&self) -> impl Iterator<Item = &VatCountrySpec> {
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
    static ref BUILTIN_VAT_REGISTRY: VatRegistry = builtin_specs()
        .and_then(VatRegistry::new)
        .expect("built-in VAT formats are consistent");
}

fn mod11(
    payload: std::ops::Range<usize>,
    weights: Vec<u32>,
    check_value: CheckValue,
    on_ten: TenPolicy,
) -> CheckDigitScheme {
    CheckDigitScheme::Mod11 {
        check: payload.end,
        payload,
        rule: Mod11Rule::new(weights, check_value, on_ten),
    }
}

fn builtin_specs() -> Result<Vec<VatCountrySpec>, RegistryError> {
    use CheckValue::{Complement, Remainder};
    use TenPolicy::{Forbidden, Zero};

    let rows: Vec<(&str, Vec<&str>, Vec<VatLiteral>, CheckDigitScheme)> = vec![
        (
            "AT",
            vec!["1!a8!n"],
            vec![VatLiteral::new(0, "U")],
            CheckDigitScheme::AustrianVat,
        ),
        (
            "BE",
            vec!["10!n"],
            vec![],
            CheckDigitScheme::Mod97Complement {
                payload: 0..8,
                check: 8..10,
            },
        ),
        ("DE", vec!["9!n"], vec![], CheckDigitScheme::Iso7064Mod11_10 { range: 0..9 }),
        (
            "DK",
            vec!["8!n"],
            vec![],
            mod11(0..7, vec![2, 7, 6, 5, 4, 3, 2], Complement, Forbidden),
        ),
        (
            "FI",
            vec!["8!n"],
            vec![],
            mod11(0..7, vec![7, 9, 10, 5, 8, 4, 2], Complement, Forbidden),
        ),
        ("FR", vec!["2!c9!n"], vec![], CheckDigitScheme::FrenchVatKey),
        ("IE", vec!["7!n1!a", "7!n2!a"], vec![], CheckDigitScheme::IrishVat),
        // the office code in digits 8 to 10 is not checked
        ("IT", vec!["11!n"], vec![], CheckDigitScheme::Luhn { range: 0..11 }),
        (
            "NL",
            vec!["9!n1!a2!n"],
            vec![VatLiteral::new(9, "B")],
            mod11(0..8, vec![9, 8, 7, 6, 5, 4, 3, 2], Remainder, Forbidden),
        ),
        (
            "PL",
            vec!["10!n"],
            vec![],
            mod11(0..9, vec![6, 5, 7, 2, 3, 4, 5, 6, 7], Remainder, Forbidden),
        ),
        (
            "PT",
            vec!["9!n"],
            vec![],
            mod11(0..8, vec![9, 8, 7, 6, 5, 4, 3, 2], Complement, Zero),
        ),
        (
            "SE",
            vec!["12!n"],
            vec![VatLiteral::new(10, "01")],
            CheckDigitScheme::Luhn { range: 0..10 },
        ),
    ];

    rows.into_iter()
        .map(|(country, layouts, literals, scheme)| {
            let layouts = layouts
                .iter()
                .map(|notation| notation.parse::<SegmentLayout>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| RegistryError::InvalidLayout {
                    country: country.to_string(),
                    source,
                })?;
            Ok(VatCountrySpec {
                country_code: country.to_string(),
                layouts,
                literals,
                scheme,
            })
        })
        .collect()
}
