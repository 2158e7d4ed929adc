//! Field-level validation.
//!
//! A [`Validator`] accumulates `field → message` pairs. Only the first failure
//! per field is kept so responses stay stable regardless of check order.

use std::collections::BTreeMap;

/// Field name → human-readable message.
pub type FieldErrors = BTreeMap<String, String>;

/// Accumulator for field-level validation failures.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no failures have been recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` for `field` unless the field already has one.
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_owned())
            .or_insert_with(|| message.to_owned());
    }

    /// Record `message` for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// Shorthand for the common "required, bounded string" rule.
    pub fn check_text(&mut self, value: &str, field: &str, max_bytes: usize) {
        self.check(!value.is_empty(), field, "must be provided");
        self.check(
            value.len() <= max_bytes,
            field,
            &format!("must not be more than {max_bytes} bytes long"),
        );
    }

    /// Consume the validator, returning `Err` with the collected errors if any.
    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
