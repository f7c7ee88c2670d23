//! Error types for API access and webhook delivery

/// Failures raised by the repository client and the notifier.
///
/// `context` names the request that failed (for example `GET /orgs/acme/repos`)
/// so a single line of output is enough to tell which call broke.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The endpoint could not be reached (DNS, refused connection, timeout).
    #[error("{context}: request failed: {source}")]
    Transport {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status.
    #[error("{context}: received status {status}")]
    Api { context: String, status: u16 },

    /// The response body was not the expected JSON shape.
    #[error("{context}: decoding response JSON: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The chat webhook answered with a non-2xx status.
    #[error("chat webhook returned status {status}")]
    Notify { status: u16 },
}

impl MonitorError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Notify { status } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Decode { .. } => None,
        }
    }
}
