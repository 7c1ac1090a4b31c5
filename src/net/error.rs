//! Request error taxonomy.
//!
//! Every failure mode of the authenticated client resolves to one of these
//! variants; nothing is swallowed. The enum is `Clone` because a refresh
//! outcome fans out to every request waiting on the shared refresh slot.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Network-level failure (unreachable host, timeout). Never treated as
    /// an authorization failure and never triggers a refresh.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The retry bound was reached without a successful recovery. Carries
    /// the status of the last response observed.
    #[error("request still unauthorized after retries (last status {status})")]
    ExhaustedRetries { status: u16 },

    /// The refresh call itself was rejected; the session has been cleared.
    #[error("session expired")]
    SessionExpired,

    /// 4xx from an auth endpoint on bad input; the backend detail message
    /// is passed through unmodified.
    #[error("rejected ({status}): {message}")]
    Validation { status: u16, message: String },

    /// Any other non-success status (5xx and unclassified 4xx).
    #[error("unexpected status {status}")]
    Unexpected { status: u16 },

    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl RequestError {
    /// True when re-authenticating could plausibly help the user.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::ExhaustedRetries { .. })
    }
}
