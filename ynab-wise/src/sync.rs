//! Runs every configured account concurrently. Each account writes its own
//! file, and one account's failure never stops the others.

use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use ynab_core::write_records;

use crate::balance::{fetch_balances, Balance};
use crate::config::RemoteConfig;
use crate::statement::{fetch_statement, slug, DateRange};
use crate::transport::ApiTransport;

/// Result for one account
#[derive(Debug)]
pub struct AccountOutcome<T> {
    pub account: String,
    pub result: Result<T>,
}

/// Output file for an account: holder name, falling back to the config name.
pub fn output_path(out_dir: &Path, holder_name: &str, config: &RemoteConfig) -> PathBuf {
    let stem = match slug(holder_name) {
        s if !s.is_empty() => s,
        _ => slug(&config.name),
    };
    let stem = if stem.is_empty() { slug(&config.account_id) } else { stem };
    out_dir.join(format!("{stem}.csv"))
}

/// Fetch one account's statement and write it as a ledger file.
pub async fn sync_account(
    transport: &dyn ApiTransport,
    config: &RemoteConfig,
    range: &DateRange,
    out_dir: &Path,
) -> Result<PathBuf> {
    let statement = fetch_statement(transport, config, range)
        .await
        .with_context(|| format!("no data for {}", config.name))?;

    let path = output_path(out_dir, &statement.account_holder.canonical_name(), config);
    let records = statement.into_records();
    write_records(&path, &records).await?;
    Ok(path)
}

/// Spawn one task per account and wait for all of them.
pub async fn sync_statements<F>(
    configs: Vec<RemoteConfig>,
    range: DateRange,
    out_dir: PathBuf,
    connect: F,
) -> Vec<AccountOutcome<PathBuf>>
where
    F: Fn(&RemoteConfig) -> Arc<dyn ApiTransport>,
{
    if configs.is_empty() {
        warn!("no configured accounts");
    }

    let names: Vec<String> = configs.iter().map(|c| c.name.clone()).collect();
    let handles = configs.into_iter().map(|config| {
        let transport = connect(&config);
        let out_dir = out_dir.clone();
        tokio::spawn(async move {
            let result = sync_account(transport.as_ref(), &config, &range, &out_dir).await;
            match &result {
                Ok(path) => info!(account = %config.name, file = %path.display(), "statement written"),
                Err(e) => error!(account = %config.name, "{e:#}"),
            }
            result
        })
    });

    collect_outcomes(names, join_all(handles).await)
}

/// Fetch balances for every account concurrently.
pub async fn balances_for_all<F>(
    configs: Vec<RemoteConfig>,
    connect: F,
) -> Vec<AccountOutcome<Vec<Balance>>>
where
    F: Fn(&RemoteConfig) -> Arc<dyn ApiTransport>,
{
    if configs.is_empty() {
        warn!("no configured accounts");
    }

    let names: Vec<String> = configs.iter().map(|c| c.name.clone()).collect();
    let handles = configs.into_iter().map(|config| {
        let transport = connect(&config);
        tokio::spawn(async move {
            let result = fetch_balances(transport.as_ref(), &config)
                .await
                .with_context(|| format!("no balances for {}", config.name));
            if let Err(e) = &result {
                error!(account = %config.name, "{e:#}");
            }
            result
        })
    });

    collect_outcomes(names, join_all(handles).await)
}

fn collect_outcomes<T>(
    names: Vec<String>,
    joined: Vec<Result<Result<T>, tokio::task::JoinError>>,
) -> Vec<AccountOutcome<T>> {
    names
        .into_iter()
        .zip(joined)
        .map(|(account, joined)| {
            let result = joined
                .with_context(|| format!("task for {account} panicked"))
                .and_then(|r| r);
            AccountOutcome { account, result }
        })
        .collect()
}
