use thiserror::Error;

/// Why an account produced no data
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("step-up challenge received but account {account} has no private key configured")]
    MissingPrivateKey { account: String },

    #[error("could not sign step-up challenge: {0:#}")]
    Signing(anyhow::Error),

    #[error("step-up challenge rejected again after signed retry")]
    StepUpRejected,

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request failed: {0:#}")]
    Transport(anyhow::Error),
}
