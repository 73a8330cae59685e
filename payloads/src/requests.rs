use crate::CourseId;
use serde::{Deserialize, Serialize};

pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MIN_SPECIALS: usize = 2;

/// Login and registration both take the same body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body for `POST /users/me/courses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollCourse {
    pub course_id: CourseId,
}

/// Body for `PATCH /courses/{id}/workouts/{workoutId}`. Counts align
/// positionally with the workout's exercise list; an empty list marks a
/// workout without exercises as completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveWorkoutProgress {
    pub progress_data: Vec<u32>,
}

/// Validation result for passwords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordValidation {
    Valid,
    TooShort,
    MissingUppercase,
    NotEnoughSpecials,
}

impl PasswordValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            Self::Valid => None,
            Self::TooShort => {
                Some("Password must be at least 6 characters")
            }
            Self::MissingUppercase => {
                Some("Password must contain at least one uppercase letter")
            }
            Self::NotEnoughSpecials => {
                Some("Password must contain at least 2 special characters")
            }
        }
    }
}

/// Validate a password.
///
/// Rules:
/// - At least 6 characters
/// - At least one uppercase letter
/// - At least two characters that are neither letters nor digits
pub fn validate_password(password: &str) -> PasswordValidation {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return PasswordValidation::TooShort;
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return PasswordValidation::MissingUppercase;
    }
    let specials = password
        .chars()
        .filter(|c| !c.is_ascii_alphanumeric())
        .count();
    if specials < PASSWORD_MIN_SPECIALS {
        return PasswordValidation::NotEnoughSpecials;
    }
    PasswordValidation::Valid
}
