//! Borderless-account statement retrieval with step-up (2FA) signing.

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ynab_core::{format_amount, sanitize_memo, CanonicalRecord, Flow};

use crate::config::RemoteConfig;
use crate::error::FetchError;
use crate::signing::ChallengeSigner;
use crate::transport::{ApiRequest, ApiResponse, ApiTransport};

pub const APPROVAL_HEADER: &str = "x-2fa-approval";
pub const APPROVAL_RESULT_HEADER: &str = "x-2fa-approval-result";
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            bail!("end date {end} is before start date {start}");
        }
        Ok(Self { start, end })
    }

    pub fn interval_start(&self) -> String {
        format!("{}T00:00:00.000Z", self.start.format("%Y-%m-%d"))
    }

    pub fn interval_end(&self) -> String {
        format!("{}T23:59:59.999Z", self.end.format("%Y-%m-%d"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub value: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    #[serde(default)]
    pub description: String,
}

/// One statement line as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEnvelope {
    #[serde(rename = "type")]
    pub direction: Direction,
    pub date: DateTime<Utc>,
    pub amount: Money,
    pub total_fees: Option<Money>,
    #[serde(default)]
    pub details: TransactionDetails,
}

impl TransactionEnvelope {
    fn fee(&self) -> Decimal {
        self.total_fees
            .as_ref()
            .map(|m| m.value)
            .unwrap_or(Decimal::ZERO)
    }

    /// `Rent, March` with 1.20 fees -> memo `Rent March (fees: 1.2)`.
    pub fn into_record(self) -> CanonicalRecord {
        let mut memo = sanitize_memo(&self.details.description);
        let fee = self.fee();
        if !fee.is_zero() {
            memo.push_str(&format!(" (fees: {})", format_amount(fee)));
        }
        let flow = match self.direction {
            Direction::Debit => Flow::Outflow,
            Direction::Credit => Flow::Inflow,
        };
        CanonicalRecord::new(&memo, flow, self.amount.value, self.date.date_naive())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountHolder {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl AccountHolder {
    /// `Jane Van Doe` -> `jane-van-doe`; empty when no name is known
    pub fn canonical_name(&self) -> String {
        slug(&format!("{} {}", self.first_name, self.last_name))
    }
}

/// Lowercase, with every run of non-alphanumeric characters turned into one `-`.
pub fn slug(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    #[serde(default)]
    pub account_holder: AccountHolder,
    #[serde(default)]
    pub transactions: Vec<TransactionEnvelope>,
}

impl Statement {
    pub fn into_records(self) -> Vec<CanonicalRecord> {
        self.transactions
            .into_iter()
            .map(TransactionEnvelope::into_record)
            .collect()
    }
}

pub fn statement_request(config: &RemoteConfig, range: &DateRange) -> ApiRequest {
    ApiRequest::get(format!(
        "/v3/profiles/{}/borderless-accounts/{}/statement.json",
        config.profile_id, config.account_id
    ))
    .query("currency", &config.currency)
    .query("intervalStart", range.interval_start())
    .query("intervalEnd", range.interval_end())
    .query("type", "COMPACT")
    .bearer(&config.token)
}

/// The challenge of a step-up rejection, if `response` is one.
pub fn step_up_challenge(response: &ApiResponse) -> Option<&str> {
    let rejected = response
        .header(APPROVAL_RESULT_HEADER)
        .is_some_and(|v| v.eq_ignore_ascii_case("REJECTED"));
    if rejected {
        response.header(APPROVAL_HEADER)
    } else {
        None
    }
}

enum StepUp {
    Initial,
    Retrying { challenge: String, signature: String },
}

async fn sign_challenge(config: &RemoteConfig, challenge: &str) -> Result<String, FetchError> {
    let path = config
        .private_key_path
        .as_deref()
        .ok_or_else(|| FetchError::MissingPrivateKey {
            account: config.name.clone(),
        })?;
    let signer = ChallengeSigner::from_file(path)
        .await
        .map_err(FetchError::Signing)?;
    signer.sign(challenge).map_err(FetchError::Signing)
}

/// Fetch the statement for `range`. A step-up rejection is answered once with
/// a signed retry; a second rejection is final.
pub async fn fetch_statement(
    transport: &dyn ApiTransport,
    config: &RemoteConfig,
    range: &DateRange,
) -> Result<Statement, FetchError> {
    let base = statement_request(config, range);
    let mut state = StepUp::Initial;

    loop {
        let request = match &state {
            StepUp::Initial => base.clone(),
            StepUp::Retrying {
                challenge,
                signature,
            } => base
                .clone()
                .header(APPROVAL_HEADER, challenge.as_str())
                .header(SIGNATURE_HEADER, signature.as_str()),
        };

        let response = transport
            .get(request)
            .await
            .map_err(FetchError::Transport)?;

        if let Some(challenge) = step_up_challenge(&response) {
            if let StepUp::Retrying { .. } = state {
                return Err(FetchError::StepUpRejected);
            }
            info!(account = %config.name, "step-up challenge received; retrying with signature");
            let signature = sign_challenge(config, challenge).await?;
            state = StepUp::Retrying {
                challenge: challenge.to_string(),
                signature,
            };
            continue;
        }

        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let statement: Statement = serde_json::from_str(&response.body)?;
        debug!(
            account = %config.name,
            transactions = statement.transactions.len(),
            "statement received"
        );
        return Ok(statement);
    }
}
