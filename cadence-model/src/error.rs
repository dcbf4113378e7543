/// Errors produced by request validation routines.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password too short: minimum {min} characters required")]
    PasswordTooShort { min: usize },

    #[error("Field `{field}` is required")]
    MissingField { field: &'static str },

    #[error("Field `{field}` exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
}
