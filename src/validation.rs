use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// The closed set of failure codes shared by every identifier family.
///
/// Callers branch on the code. The message attached to a [ValidationError] is
/// for humans only and may change between releases.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
    /// Nothing left to validate after normalization
    InvalidInput,
    /// A character does not belong to the class its position requires
    InvalidFormat,
    /// A whole-identifier checksum (Luhn, modulo 97, ISO 7064) does not hold
    InvalidChecksum,
    /// The leading country code is not two letters
    InvalidCountryCode,
    /// Wrong number of characters for the identifier or country
    InvalidLength,
    /// The identifier can never be valid, e.g. its weighted sum hits a forbidden remainder
    InvalidIdentifier,
    /// Well-formed country code without a registered descriptor
    UnsupportedCountry,
    /// An explicit check digit or check character does not match the computed one
    InvalidCheckDigit,
}

impl ErrorCode {
    /// Stable key for looking up a localized message outside this crate.
    pub fn message_id(self) -> &'static str {
        self.into()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    code: ErrorCode,
    message: String,
}

impl ValidationError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Outcome of a single `validate` call.
///
/// A result is valid iff it carries no errors. It can only be built through
/// [ValidationResult::success] or one of the failure constructors and is never
/// mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self { errors: vec![] }
    }

    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            errors: vec![ValidationError::new(code, message)],
        }
    }

    /// Builds a failed result from several errors, in the order they were found.
    ///
    /// Panics if `errors` is empty: an empty list is a success and must be built
    /// with [ValidationResult::success].
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        assert!(
            !errors.is_empty(),
            "a failed validation result needs at least one error"
        );
        Self { errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Code of the first error, `None` for a valid result.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.errors.first().map(ValidationError::code)
    }
}

impl From<ValidationError> for ValidationResult {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl<T> From<Result<T, ValidationError>> for ValidationResult {
    fn from(result: Result<T, ValidationError>) -> Self {
        match result {
            Ok(_) => Self::success(),
            Err(err) => err.into(),
        }
    }
}
