//! Validation error types

use std::fmt;

/// Validation error for user-supplied domain values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Numeric field must be greater than zero
    NotPositive { field: &'static str, value: i64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::NotPositive { field, value } => {
                write!(f, "{} must be greater than 0 (got {})", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Trim and check a free-form name against emptiness and a length cap.
pub(crate) fn validate_name(
    field: &'static str,
    raw: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if name.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(name.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "line name",
            max: 255,
        };
        assert_eq!(
            err.to_string(),
            "line name exceeds maximum length of 255 characters"
        );

        let err = ValidationError::NotPositive {
            field: "intervalTime",
            value: -3,
        };
        assert_eq!(err.to_string(), "intervalTime must be greater than 0 (got -3)");
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(validate_name("name", "  강남역 ", 10).unwrap(), "강남역");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // three Hangul syllables are nine bytes
        assert!(validate_name("name", "신분당", 3).is_ok());
        assert!(matches!(
            validate_name("name", "신분당선", 3),
            Err(ValidationError::TooLong { max: 3, .. })
        ));
    }

    #[test]
    fn rejects_blank() {
        assert_eq!(
            validate_name("name", "   ", 10),
            Err(ValidationError::Empty { field: "name" })
        );
    }
}
