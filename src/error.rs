use std::fmt;

/// All errors produced by cronbit.
///
/// A recurrence whose explicit year bound lies behind the reference instant
/// is not an error: that outcome is the `Ok(None)` return of
/// [`Recurrence::next_from`](crate::Recurrence::next_from).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecurrenceError {
    /// The spec violates a structural invariant. Caught before any
    /// resolution begins.
    Validation {
        field: &'static str,
        message: String,
    },

    /// A configured mask turned out to be unreachable mid-resolution.
    Unsatisfiable {
        field: &'static str,
        message: String,
    },
}

impl RecurrenceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn unsatisfiable(field: &'static str, message: impl Into<String>) -> Self {
        Self::Unsatisfiable {
            field,
            message: message.into(),
        }
    }

    /// The spec field this error implicates.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Validation { field, .. } | Self::Unsatisfiable { field, .. } => field,
        }
    }
}

impl fmt::Display for RecurrenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { field, message } => write!(f, "invalid {field}: {message}"),
            Self::Unsatisfiable { field, message } => {
                write!(f, "unsatisfiable {field}: {message}")
            }
        }
    }
}

impl std::error::Error for RecurrenceError {}
