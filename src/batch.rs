//! Validation of many identifiers at once, spread over the rayon thread pool.
//! Results come back in input order.

use rayon::prelude::*;

use crate::validation::ValidationResult;
use crate::validator::IdentifierValidator;

pub fn validate_all<V, S>(validator: &V, inputs: &[S]) -> Vec<ValidationResult>
where
    V: IdentifierValidator,
    S: AsRef<str> + Sync,
{
    inputs
        .par_iter()
        .map(|input| validator.validate(input.as_ref()))
        .collect()
}

pub fn parse_all<V, S>(validator: &V, inputs: &[S]) -> Vec<Option<V::Details>>
where
    V: IdentifierValidator,
    V::Details: Send,
    S: AsRef<str> + Sync,
{
    inputs
        .par_iter()
        .map(|input| validator.parse(input.as_ref()))
        .collect()
}
