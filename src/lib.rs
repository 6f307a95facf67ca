// This blocks accidental use of `println`. If one is actually needed, you can
// override with `#[allow(clippy::print_stdout)]`.
#![deny(clippy::print_stdout)]

mod batch;
mod checksum;
mod error;
mod iban;
mod normalization;
mod observability;
mod payment_reference;
mod structure;
mod validation;
mod validator;
mod vat;

// This is the public API of the finval library
pub use batch::{parse_all, validate_all};
pub use checksum::{
    alphabet_position, iso13616_value, iso7064_mod11_10_check_digit, iso7064_mod11_10_is_valid,
    luhn_check_digit, luhn_is_valid, mod97, mod97_chars, mod97_check_digits, weighted_sum,
    CheckDigitScheme, CheckValue, Mod11Outcome, Mod11Rule, TenPolicy, MAX_MOD97_CHECK_WIDTH,
    MAX_WEIGHT,
};
pub use error::RegistryError;
pub use iban::{
    parse_bban, parse_bban_with, parse_iban, parse_iban_with, validate_bban, validate_bban_with,
    validate_iban, validate_iban_with, BbanDetails, IbanCountrySpec, IbanDetails, IbanRegistry,
};
pub use normalization::{format_grouped, normalize, normalize_optional, strip_country_prefix};
pub use payment_reference::{
    create_rf_reference, parse_payment_reference, validate_payment_reference,
    PaymentReferenceDetails, ReferenceFormat,
};
pub use structure::{CharClass, LayoutParseError, Segment, SegmentLayout};
pub use validation::{ErrorCode, ValidationError, ValidationResult};
pub use validator::{
    BbanValidator, IbanValidator, IdentifierValidator, PaymentReferenceValidator, VatValidator,
};
pub use vat::{
    parse_vat, parse_vat_for_country, parse_vat_for_country_with, parse_vat_with, validate_vat,
    validate_vat_for_country, validate_vat_for_country_with, validate_vat_with, VatCountrySpec,
    VatDetails, VatLiteral, VatRegistry,
};
