use reqwest::StatusCode;

/// Why a dispatch did not complete with `200 OK`.
///
/// Nothing here is retried; the caller decides whether to exit, log or
/// propagate.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unable to serialize dispatch payload: {0}")]
    Serialization(String),

    #[error("unable to create dispatch request: {0}")]
    RequestConstruction(String),

    #[error("unable to send dispatch request: {0}")]
    Transport(String),

    #[error("dispatch request failed: {status} {reason}: {body}")]
    Rejected {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("dispatch request failed with status {status}, unable to read response body: {message}")]
    ResponseRead { status: u16, message: String },

    #[error("unable to start dispatch runtime: {0}")]
    Runtime(String),
}

impl DispatchError {
    pub(crate) fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            reason: canonical_reason(status).to_string(),
            body: body.into(),
        }
    }

    /// HTTP status returned by the remote, when one arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::ResponseRead { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn canonical_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_carries_status_line_and_body() {
        let err = DispatchError::rejected(401, "Bad credentials");
        let message = err.to_string();

        assert!(message.contains("401 Unauthorized"));
        assert!(message.contains("Bad credentials"));
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn transport_errors_have_no_status() {
        assert_eq!(DispatchError::Transport("refused".into()).status(), None);
    }
}
