use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`ClientError`] failures.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failures of the outbound HTTP collaborators.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build HTTP client")]
    ClientBuilder {
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or timed out.
    #[error("request to `{url}` failed")]
    RequestSend {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },
    /// The remote service answered with a non-success status.
    #[error("unexpected response status {status} from `{url}`")]
    RequestStatus {
        /// Requested URL.
        url: String,
        /// Status returned.
        status: StatusCode,
    },
    /// The body could not be decoded.
    #[error("failed to decode response from `{url}`")]
    DecodeResponse {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },
    /// The translation payload did not contain any translated segment.
    #[error("translation response for `{text}` has no translated text")]
    MalformedTranslation {
        /// Text sent for translation.
        text: String,
    },
}
