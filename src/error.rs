use thiserror::Error;

use crate::structure::LayoutParseError;

/// A country table handed to a registry is inconsistent.
///
/// These are raised once, when the registry is built, so that validation itself
/// never has to deal with a broken descriptor.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("`{0}` is not a two-letter upper-case country code")]
    InvalidCountryCode(String),

    #[error("{0} is registered more than once")]
    DuplicateCountry(String),

    #[error("{country}: declared length {declared} but the layout covers {computed}")]
    LengthMismatch {
        country: String,
        declared: usize,
        computed: usize,
    },

    #[error("{country}: {source}")]
    InvalidLayout {
        country: String,
        #[source]
        source: LayoutParseError,
    },

    #[error("{0}: at least one layout is required")]
    MissingLayout(String),

    #[error("{country}: positions up to {end} do not fit in {length} characters")]
    RangeOutOfBounds {
        country: String,
        end: usize,
        length: usize,
    },

    #[error("{country}: {weights} weights for {digits} digits")]
    WeightCount {
        country: String,
        weights: usize,
        digits: usize,
    },

    #[error("{country}: mod 97 check digits span {width} positions, expected 1 or 2")]
    CheckWidth { country: String, width: usize },

    #[error("{country}: weight {weight} is larger than 99")]
    WeightTooLarge { country: String, weight: u32 },
}
