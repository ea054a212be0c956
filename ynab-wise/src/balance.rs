//! Current balances per currency for a profile. Read-only; no step-up handling.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::RemoteConfig;
use crate::error::FetchError;
use crate::statement::Money;
use crate::transport::{ApiRequest, ApiTransport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub currency: String,
    pub amount: Money,
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount.value, self.currency)
    }
}

pub fn balances_request(config: &RemoteConfig) -> ApiRequest {
    ApiRequest::get(format!("/v4/profiles/{}/balances", config.profile_id))
        .query("types", "STANDARD")
        .bearer(&config.token)
}

pub async fn fetch_balances(
    transport: &dyn ApiTransport,
    config: &RemoteConfig,
) -> Result<Vec<Balance>, FetchError> {
    let response = transport
        .get(balances_request(config))
        .await
        .map_err(FetchError::Transport)?;

    if !response.is_success() {
        return Err(FetchError::Status {
            status: response.status,
            body: response.body,
        });
    }
    Ok(serde_json::from_str(&response.body)?)
}
