use ontbridge_explorer::ExplorerClientError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::value::ArgType;

#[derive(Debug, Error)]
pub enum DapiError {
    #[error("provider rejected the request: {0}")]
    Provider(String),

    #[error("please login")]
    NotLoggedIn,

    #[error("invoke rejected by provider with code {code}")]
    InvokeRejected { code: i64 },

    #[error("unsupported argument type: {0}")]
    UnsupportedArgType(String),

    #[error("invalid {arg_type} value: {value:?}")]
    InvalidArgValue { arg_type: ArgType, value: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("explorer error {code}: {desc}")]
    Explorer { code: i64, desc: String },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Client(#[from] ExplorerClientError),

    #[error("notification poll for {txhash} timed out after {elapsed_ms}ms")]
    PollTimeout { txhash: String, elapsed_ms: u64 },

    #[error("notification poll for {txhash} gave up after {attempts} attempts")]
    PollExhausted { txhash: String, attempts: u32 },

    #[error("notification poll for {txhash} was cancelled")]
    PollCancelled { txhash: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DapiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Provider(_) => "provider",
            Self::NotLoggedIn => "not_logged_in",
            Self::InvokeRejected { .. } => "invoke_rejected",
            Self::UnsupportedArgType(_) => "unsupported_arg_type",
            Self::InvalidArgValue { .. } => "invalid_arg_value",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Explorer { .. } => "explorer",
            Self::UnexpectedResponse(_) => "unexpected_response",
            Self::Client(_) => "client",
            Self::PollTimeout { .. } => "poll_timeout",
            Self::PollExhausted { .. } => "poll_exhausted",
            Self::PollCancelled { .. } => "poll_cancelled",
            Self::Config(_) => "invalid_config",
            Self::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DapiError;

    #[test]
    fn business_errors_keep_their_wire_text() {
        assert_eq!(DapiError::NotLoggedIn.to_string(), "please login");
        assert_eq!(DapiError::NotLoggedIn.code(), "not_logged_in");
        assert_eq!(
            DapiError::InvokeRejected { code: 1 }.to_string(),
            "invoke rejected by provider with code 1"
        );
    }
}
