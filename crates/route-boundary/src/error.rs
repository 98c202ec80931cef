use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the route boundary detector.
///
/// Only structural problems with the input are errors. A shift where no
/// departure or arrival can be confirmed is a valid, empty result.
#[derive(Error, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Error {
    /// The pings or the detector configuration cannot be processed.
    #[error("code: precondition_violation, description: {0}")]
    PreconditionViolation(String),
}

impl Error {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &str {
        match self {
            Self::PreconditionViolation(_) => "precondition_violation",
        }
    }

    /// Returns the error description.
    #[must_use]
    pub fn description(&self) -> String {
        self.to_string()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = Error::PreconditionViolation("ping sequence is empty".to_string());
        assert_eq!(err.code(), "precondition_violation");
        assert_eq!(
            err.to_string(),
            "code: precondition_violation, description: ping sequence is empty"
        );
    }
}
