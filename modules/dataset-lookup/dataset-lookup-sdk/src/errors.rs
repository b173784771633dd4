//! Public error types for the `dataset-lookup` module.
//!
//! Most failures never reach callers as errors: they are turned into
//! displayable sentinel values. Only the cases below surface.

use thiserror::Error;

use crate::models::FunctionName;

/// Errors that can be returned by the `DatasetLookupApi` and the function registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The lookup service reported an error for this particular invocation.
    #[error("{message}")]
    Service { message: String },

    /// The invocation was dropped before it could be settled (runtime shut down).
    #[error("lookup abandoned before completion")]
    Abandoned,

    /// The host asked for a function that is not registered.
    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    /// Wrong number of arguments for a function.
    #[error("{function} expects {expected} argument(s), got {actual}")]
    Arity {
        function: FunctionName,
        expected: usize,
        actual: usize,
    },
}

impl LookupError {
    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::UnknownFunction { name: name.into() }
    }

    #[must_use]
    pub fn arity(function: FunctionName, actual: usize) -> Self {
        Self::Arity {
            function,
            expected: function.arity(),
            actual,
        }
    }
}
