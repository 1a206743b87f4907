//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Validation failures are split by what was being validated (sampler, parameter,
//! general configuration) and kept apart from [`Error::Sampler`], which signals a
//! logic defect discovered while sampling an already validated configuration.
use std::thread::ThreadId;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid sampler configuration: {0}")]
    SamplerValidation(String),

    #[error("invalid parameter configuration: {0}")]
    ParameterValidation(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("sampler error: {0}")]
    Sampler(String),

    #[error("scenario error: {0}")]
    Scenario(String),

    #[error("capture error: {0}")]
    Capture(String),

    #[error("called from thread {actual:?}, expected main thread {expected:?}")]
    WrongThread { expected: ThreadId, actual: ThreadId },

    #[error(transparent)]
    Encode(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns true for errors raised while validating a configuration.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::SamplerValidation(_) | Error::ParameterValidation(_) | Error::InvalidConfig(_)
        )
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        matches!(err, Error::Other(_))
            .then_some(())
            .expect("expected Other variant");
    }

    #[test]
    fn from_str_allocates_owned_message() {
        let err: Error = "issue".into();
        assert!(matches!(err, Error::Other(ref msg) if msg == "issue"));
    }

    #[test]
    fn validation_errors_are_distinct_from_runtime_sampler_errors() {
        assert!(Error::SamplerValidation("range".into()).is_validation());
        assert!(Error::ParameterValidation("sum".into()).is_validation());
        assert!(Error::InvalidConfig("seed".into()).is_validation());
        assert!(!Error::Sampler("no option".into()).is_validation());
        assert!(!Error::Capture("unknown".into()).is_validation());
    }

    #[test]
    fn display_prefixes_the_error_kind() {
        let err = Error::Sampler("no option matched 0.5".into());
        assert_eq!(err.to_string(), "sampler error: no option matched 0.5");
    }
}
