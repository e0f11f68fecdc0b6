use reqwest::StatusCode;
use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failures talking to the results API
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to build HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to send request to `{url}`")]
    RequestSend {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response status {status} for `{url}`")]
    RequestStatus { url: String, status: StatusCode },

    #[error("failed to decode response from `{url}`")]
    DecodeResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid session time `{value}`")]
    InvalidDate { value: String },

    #[error("invalid round number `{value}`")]
    InvalidRound { value: String },
}
