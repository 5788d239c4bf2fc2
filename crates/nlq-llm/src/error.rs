use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key not set: export {0}")]
    MissingApiKey(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx response; carries the provider's message.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Response(String),
}
