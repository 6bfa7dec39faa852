//! Request payloads accepted by the JSON API.
//!
//! Each form is deserialized from the request, checked with `validator` and
//! converted into a payload of domain value objects before it reaches the
//! repository.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod claims;
pub mod clients;
pub mod depreciation;
pub mod documents;
pub mod estimates;
pub mod jobs;
pub mod leads;
pub mod members;
pub mod organizations;
pub mod properties;
pub mod webhooks;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid url")]
    InvalidUrl,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid colour, expected #RRGGBB")]
    InvalidColor,

    #[error("invalid state code")]
    InvalidState,

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("invalid identifier")]
    InvalidId,

    #[error("{0}")]
    InvalidValue(String),

    #[error("csv error: {0}")]
    Csv(String),
}

impl From<TypeConstraintError> for FormError {
    fn from(err: TypeConstraintError) -> Self {
        match err {
            TypeConstraintError::InvalidEmail => FormError::InvalidEmail,
            TypeConstraintError::InvalidPhone => FormError::InvalidPhoneNumber,
            TypeConstraintError::InvalidUrl => FormError::InvalidUrl,
            TypeConstraintError::InvalidColor => FormError::InvalidColor,
            TypeConstraintError::InvalidStateCode => FormError::InvalidState,
            TypeConstraintError::NonPositiveId => FormError::InvalidId,
            other => FormError::InvalidValue(other.to_string()),
        }
    }
}

/// Trims the value and drops it when nothing is left.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Applies `parse` to a non-blank optional value.
pub(crate) fn parse_optional<T, E>(
    value: Option<String>,
    parse: impl FnOnce(String) -> Result<T, E>,
) -> Result<Option<T>, E> {
    non_blank(value).map(parse).transpose()
}
