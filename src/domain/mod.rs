use thiserror::Error;
use validator::ValidationErrors;

pub mod post;
pub mod todo;
pub mod user;

#[cfg(test)]
pub mod test_util;

#[derive(Error, Debug)]
pub enum Error {
    #[error("input was invalid: {0}")]
    Invalid(ValidationErrors),
    #[error("requested data does not exist")]
    DoesNotExist,
    #[error("a record with the same unique key already exists")]
    Duplicate,
    #[error("failed to {action} due to a communication failure: {cause}")]
    RetrieveFailure {
        action: String,
        #[source]
        cause: anyhow::Error,
    },
}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Self::Invalid(value)
    }
}

/// Error produced by the storage ports. Both database backends funnel their native
/// failure types into this, so callers see a single duplicate-key condition no matter
/// which engine raised it.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("a row with the same unique key is already present")]
    DuplicateKey,
    #[error("a communication failure occurred: {0}")]
    CommsFailure(#[from] anyhow::Error),
}

impl StoreError {
    /// Converts this StoreError to a domain error with some extra info on the [action]
    /// being taken when communicating with the store
    fn into_error_trying_to(self, action: &str) -> Error {
        match self {
            Self::DuplicateKey => Error::Duplicate,
            Self::CommsFailure(cause) => Error::RetrieveFailure {
                action: action.into(),
                cause,
            },
        }
    }
}
