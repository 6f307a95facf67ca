use crate::iban::{
    parse_bban_with, parse_iban_with, validate_bban_with, validate_iban_with, BbanDetails,
    IbanDetails, IbanRegistry,
};
use crate::payment_reference::{
    parse_payment_reference, validate_payment_reference, PaymentReferenceDetails, ReferenceFormat,
};
use crate::validation::ValidationResult;
use crate::vat::{
    parse_vat_for_country_with, parse_vat_with, validate_vat_for_country_with, validate_vat_with,
    VatDetails, VatRegistry,
};

/// The two operations every identifier family offers.
///
/// `validate` never panics on user input. `parse` returns `Some` exactly when
/// `validate` would report the input as valid.
pub trait IdentifierValidator: Send + Sync {
    type Details;

    fn validate(&self, raw: &str) -> ValidationResult;

    fn parse(&self, raw: &str) -> Option<Self::Details>;
}

#[derive(Clone, Copy, Debug)]
pub struct IbanValidator<'r> {
    registry: &'r IbanRegistry,
}

impl<'r> IbanValidator<'r> {
    pub fn new(registry: &'r IbanRegistry) -> Self {
        IbanValidator { registry }
    }
}

impl Default for IbanValidator<'static> {
    fn default() -> Self {
        IbanValidator::new(IbanRegistry::builtin())
    }
}

impl IdentifierValidator for IbanValidator<'_> {
    type Details = IbanDetails;

    fn validate(&self, raw: &str) -> ValidationResult {
        validate_iban_with(self.registry, raw)
    }

    fn parse(&self, raw: &str) -> Option<IbanDetails> {
        parse_iban_with(self.registry, raw)
    }
}

/// Validates bare BBANs of a single country.
#[derive(Clone, Debug)]
pub struct BbanValidator<'r> {
    registry: &'r IbanRegistry,
    country: String,
}

impl<'r> BbanValidator<'r> {
    pub fn new(registry: &'r IbanRegistry, country: &str) -> Self {
        BbanValidator {
            registry,
            country: country.to_owned(),
        }
    }
}

impl BbanValidator<'static> {
    pub fn for_country(country: &str) -> Self {
        BbanValidator::new(IbanRegistry::builtin(), country)
    }
}

impl IdentifierValidator for BbanValidator<'_> {
    type Details = BbanDetails;

    fn validate(&self, raw: &str) -> ValidationResult {
        validate_bban_with(self.registry, &self.country, raw)
    }

    fn parse(&self, raw: &str) -> Option<BbanDetails> {
        parse_bban_with(self.registry, &self.country, raw)
    }
}

/// Validates VAT numbers. With a country, the prefix becomes optional and
/// numbers of other countries are rejected.
#[derive(Clone, Debug)]
pub struct VatValidator<'r> {
    registry: &'r VatRegistry,
    country: Option<String>,
}

impl<'r> VatValidator<'r> {
    pub fn new(registry: &'r VatRegistry) -> Self {
        VatValidator {
            registry,
            country: None,
        }
    }

    pub fn with_country(mut self, country: &str) -> Self {
        self.country = Some(country.to_owned());
        self
    }
}

impl Default for VatValidator<'static> {
    fn default() -> Self {
        VatValidator::new(VatRegistry::builtin())
    }
}

impl IdentifierValidator for VatValidator<'_> {
    type Details = VatDetails;

    fn validate(&self, raw: &str) -> ValidationResult {
        match &self.country {
            Some(country) => validate_vat_for_country_with(self.registry, country, raw),
            None => validate_vat_with(self.registry, raw),
        }
    }

    fn parse(&self, raw: &str) -> Option<VatDetails> {
        match &self.country {
            Some(country) => parse_vat_for_country_with(self.registry, country, raw),
            None => parse_vat_with(self.registry, raw),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PaymentReferenceValidator {
    format: Option<ReferenceFormat>,
}

impl PaymentReferenceValidator {
    pub fn new(format: Option<ReferenceFormat>) -> Self {
        PaymentReferenceValidator { format }
    }
}

impl IdentifierValidator for PaymentReferenceValidator {
    type Details = PaymentReferenceDetails;

    fn validate(&self, raw: &str) -> ValidationResult {
        validate_payment_reference(raw, self.format)
    }

    fn parse(&self, raw: &str) -> Option<PaymentReferenceDetails> {
        parse_payment_reference(raw, self.format)
    }
}
