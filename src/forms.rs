//! Form validation errors

use std::fmt;

use smallvec::SmallVec;

/// A validation failure on a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as submitted, e.g. `street_number`
    pub field: &'static str,

    /// Message shown next to the field
    pub message: String,
}

impl FieldError {
    /// The message used for a missing required field.
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            message: "This field is required.".to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error raised by one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(SmallVec<[FieldError; 8]>);

impl FieldErrors {
    /// Records a field error.
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Records a "required" error when `value` is blank.
    pub fn require(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(FieldError::required(field));
        }
    }

    /// Whether the named field has an error.
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    /// Iterate over the recorded errors.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Number of errors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no errors were recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collected errors when at least one was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, error) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }

            write!(f, "{error}")?;
        }

        Ok(())
    }
}

impl std::error::Error for FieldErrors {}
