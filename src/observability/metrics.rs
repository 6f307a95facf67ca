use metrics::counter;

use crate::observability::labels::Labels;
use crate::validation::{ErrorCode, ValidationResult};

const VALIDATION_COUNT: &str = "validation.count";
const FAMILY: &str = "family";
const OUTCOME: &str = "outcome";
const VALID: &str = "valid";

/// Counts `validate` calls of one identifier family, split by outcome: `valid`
/// or the message id of the first error.
pub struct ValidationMetrics {
    labels: Labels,
}

impl ValidationMetrics {
    pub fn new(family: &'static str) -> Self {
        ValidationMetrics {
            labels: Labels::new(&[(FAMILY, family)]),
        }
    }

    pub fn record(&self, result: &ValidationResult) {
        let outcome = result.error_code().map_or(VALID, ErrorCode::message_id);
        counter!(
            VALIDATION_COUNT,
            self.labels.clone_with_labels(&[(OUTCOME, outcome)])
        )
        .increment(1);
    }
}
