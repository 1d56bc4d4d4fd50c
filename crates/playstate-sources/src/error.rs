/// Failures talking to a media server.
///
/// Messages stay short enough to show an operator; response bodies and
/// headers are written to the log where the failure happens and are not
/// carried here.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("server returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("invalid API key: {0}")]
    InvalidToken(String),

    #[error("invalid server URL '{0}'")]
    InvalidUrl(String),
}
