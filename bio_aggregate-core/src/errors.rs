//! Errors which can occur while operating on an aggregate.
//!
//! All error types of the concepts crate convert into [AggregateError] via `?`.
pub use crate::storage::StorageError;
use bio_aggregate_concepts::*;
use core::fmt::Display;

macro_rules! impl_error_variant {
    ($name: ident, $($err_var: ident),+) => {
        // Implement Display for ErrorVariant
        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        $name::$err_var(message) => write!(f, "{}", message),
                    )+
                }
            }
        }
    }
}

macro_rules! impl_from_error {
    ($name: ident, $(($err_var: ident, $err_type: ty)),+) => {
        $(
            // Implement conversion from error to errorvariant
            impl From<$err_type> for $name {
                fn from(err: $err_type) -> Self {
                    $name::$err_var(err)
                }
            }
        )+
    }
}

/// Covers all errors that can occur while operating on a cellular aggregate.
///
/// The errors are listed from very likely to be a user error to almost certainly an internal
/// error.
#[derive(Debug)]
pub enum AggregateError {
    /// See [PreconditionViolation]
    PreconditionViolation(PreconditionViolation),
    /// See [NotFound]
    NotFound(NotFound),
    /// See [IndexOutOfRange]
    IndexOutOfRange(IndexOutOfRange),
    /// See [InvalidState]
    InvalidState(InvalidState),
    /// See [SetupError]
    SetupError(SetupError),
    /// See [CalcError]
    CalcError(CalcError),
    /// See [RngError]
    RngError(RngError),

    /// See [StorageError]
    StorageError(StorageError),
    /// Failed io operation, for example while drawing the progress bar
    IoError(std::io::Error),
    /// The dedicated thread pool could not be constructed
    ThreadingError(rayon::ThreadPoolBuildError),
}

impl_from_error! {AggregateError,
    (PreconditionViolation, PreconditionViolation),
    (NotFound, NotFound),
    (IndexOutOfRange, IndexOutOfRange),
    (InvalidState, InvalidState),
    (SetupError, SetupError),
    (CalcError, CalcError),
    (RngError, RngError),
    (StorageError, StorageError),
    (IoError, std::io::Error),
    (ThreadingError, rayon::ThreadPoolBuildError)
}

impl_error_variant! {AggregateError,
    PreconditionViolation,
    NotFound,
    IndexOutOfRange,
    InvalidState,
    SetupError,
    CalcError,
    RngError,
    StorageError,
    IoError,
    ThreadingError
}

impl std::error::Error for AggregateError {}
