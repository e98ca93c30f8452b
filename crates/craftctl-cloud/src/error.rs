use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CloudControlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "No instance matched id {instance_id}. Check that the id is correct.\nProvider response: {response}"
    )]
    NotFound {
        instance_id: String,
        response: String,
    },

    #[error("Unrecognized instance status: {0}")]
    UnknownState(String),

    #[error("Provider rejected the start request (code {code})")]
    Start { code: String },

    #[error("Provider rejected the stop request (code {code})")]
    Stop { code: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CloudControlError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }
}

impl From<reqwest::Error> for CloudControlError {
    fn from(error: reqwest::Error) -> Self {
        CloudControlError::Api(error.to_string())
    }
}
