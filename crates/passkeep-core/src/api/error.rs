use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Request rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),

    #[error("No active session - sign in first")]
    NoSession,

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server replied with status {status}")]
    BadStatus { status: reqwest::StatusCode },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Response carried neither data nor errors")]
    MissingData,
}

/// How a failed vault call must be handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureClass {
    /// Recoverable rejection of the submitted input; the messages are
    /// surfaced verbatim, in server order.
    Validation(Vec<String>),
    /// The current session can no longer be trusted: clear it, drop the
    /// collection, and force sign-in.
    SessionExpired,
}

impl VaultError {
    /// Classifies a failed call.
    ///
    /// A non-empty validation list is the one signal the server gives for a
    /// recoverable rejection. Every other failure shape, including a
    /// rejection with an empty list, means session expiry.
    pub fn classify(self) -> FailureClass {
        match self {
            VaultError::Rejected(messages) if !messages.is_empty() => {
                FailureClass::Validation(messages)
            }
            _ => FailureClass::SessionExpired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_nonempty_rejection_is_validation() {
        let error = VaultError::Rejected(vec![
            "password too short".to_string(),
            "the e-mail address is already taken".to_string(),
        ]);

        // Messages come through verbatim and in order
        match error.classify() {
            FailureClass::Validation(messages) => {
                assert_eq!(messages.len(), 2);
                assert_eq!(messages[0], "password too short");
                assert_eq!(messages[1], "the e-mail address is already taken");
            }
            FailureClass::SessionExpired => panic!("expected validation"),
        }
    }

    #[test]
    fn test_classify_empty_rejection_is_expiry() {
        let error = VaultError::Rejected(Vec::new());
        assert_eq!(error.classify(), FailureClass::SessionExpired);
    }

    #[test]
    fn test_classify_unstructured_failures_are_expiry() {
        assert_eq!(
            VaultError::BadStatus {
                status: reqwest::StatusCode::UNAUTHORIZED
            }
            .classify(),
            FailureClass::SessionExpired
        );
        assert_eq!(
            VaultError::Decode("not json".to_string()).classify(),
            FailureClass::SessionExpired
        );
        assert_eq!(VaultError::MissingData.classify(), FailureClass::SessionExpired);
        assert_eq!(VaultError::NoSession.classify(), FailureClass::SessionExpired);
    }
}
