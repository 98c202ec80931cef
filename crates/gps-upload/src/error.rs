use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for GPS upload processing.
///
/// Validation failures reject the whole upload before anything is detected or
/// stored. A route without a confirmed start or end is not an error.
#[derive(Error, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Error {
    /// The upload is not a readable CSV export or holds a bad coordinate.
    #[error("code: invalid_format, description: {0}")]
    InvalidFormat(String),

    /// A GPS time is in none of the recognised formats.
    #[error("code: invalid_timestamp, description: {0}")]
    InvalidTimestamp(String),

    /// No row of the upload carries a mobile id and GPS time.
    #[error("code: no_data, description: upload contains no usable GPS rows")]
    NoData,

    /// The upload was reported by a vehicle other than the shift's.
    #[error("code: vehicle_mismatch, description: {0}")]
    VehicleMismatch(String),

    /// The upload starts on a date the shift does not cover.
    #[error("code: date_mismatch, description: {0}")]
    DateMismatch(String),

    /// The shift does not exist.
    #[error("code: not_found, description: {0}")]
    NotFound(String),

    /// The detector refused the decoded pings.
    #[error("code: precondition_violation, description: {0}")]
    Precondition(String),

    /// The state store failed or holds malformed data.
    #[error("code: server_error, description: {0}")]
    ServerError(String),
}

impl Error {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &str {
        match self {
            Self::InvalidFormat(_) => "invalid_format",
            Self::InvalidTimestamp(_) => "invalid_timestamp",
            Self::NoData => "no_data",
            Self::VehicleMismatch(_) => "vehicle_mismatch",
            Self::DateMismatch(_) => "date_mismatch",
            Self::NotFound(_) => "not_found",
            Self::Precondition(_) => "precondition_violation",
            Self::ServerError(_) => "server_error",
        }
    }

    /// Returns the error description.
    #[must_use]
    pub fn description(&self) -> String {
        self.to_string()
    }

    /// Whether the upload was rejected by validation against its shift.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::VehicleMismatch(_) | Self::DateMismatch(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<Self>() {
            Some(Self::InvalidFormat(e)) => Self::InvalidFormat(format!("{err}: {e}")),
            Some(Self::InvalidTimestamp(e)) => Self::InvalidTimestamp(format!("{err}: {e}")),
            Some(Self::VehicleMismatch(e)) => Self::VehicleMismatch(format!("{err}: {e}")),
            Some(Self::DateMismatch(e)) => Self::DateMismatch(format!("{err}: {e}")),
            Some(Self::NotFound(e)) => Self::NotFound(format!("{err}: {e}")),
            Some(Self::Precondition(e)) => Self::Precondition(format!("{err}: {e}")),
            Some(Self::ServerError(e)) => Self::ServerError(format!("{err}: {e}")),
            Some(Self::NoData) => Self::NoData,
            None => {
                let stack = err.chain().fold(String::new(), |cause, e| format!("{cause} -> {e}"));
                let stack = stack.trim_start_matches(" -> ").to_string();
                Self::ServerError(stack)
            }
        }
    }
}

impl From<route_boundary::Error> for Error {
    fn from(err: route_boundary::Error) -> Self {
        match err {
            route_boundary::Error::PreconditionViolation(e) => Self::Precondition(e),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::InvalidFormat(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidFormat(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use anyhow::{Context, anyhow};
    use serde_json::Value;

    use super::*;

    #[test]
    fn upload_context() {
        let result = Err::<(), Error>(Error::NotFound("shift 42".to_string()))
            .context("loading shift");
        let err: Error = result.unwrap_err().into();

        assert_eq!(err.to_string(), "code: not_found, description: loading shift: shift 42");
    }

    #[test]
    fn anyhow_context() {
        let result = Err::<(), anyhow::Error>(anyhow!("bucket closed")).context("saving pings");
        let err: Error = result.unwrap_err().into();

        assert_eq!(
            err.to_string(),
            "code: server_error, description: saving pings -> bucket closed"
        );
    }

    #[test]
    fn serde_error() {
        let err: Error = serde_json::from_str::<Value>(r#"{"id": "#).unwrap_err().into();
        assert_eq!(err.code(), "invalid_format");
    }

    #[test]
    fn detector_error() {
        let err: Error =
            route_boundary::Error::PreconditionViolation("ping sequence is empty".to_string())
                .into();
        assert_eq!(
            err.to_string(),
            "code: precondition_violation, description: ping sequence is empty"
        );
        assert!(!err.is_rejection());
    }
}
