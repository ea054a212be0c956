use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use ynab_ingest::{convert_export, StatementProfile};
use ynab_wise::{
    balances_for_all, load_configs, sync_statements, ApiTransport, DateRange, RemoteConfig,
    ReqwestTransport,
};

/// Ledger written by `post`, in the working directory
pub const POST_OUTPUT: &str = "post-ynab.csv";

pub async fn post(filename: &Path) -> Result<()> {
    info!(file = %filename.display(), "importing postal statement");

    let summary = convert_export(filename, Path::new(POST_OUTPUT), &StatementProfile::postal())
        .await
        .with_context(|| format!("converting {}", filename.display()))?;

    if summary.header_row == 0 {
        warn!("header row not found; the whole export was kept");
    }
    if summary.invalid_dates > 0 {
        warn!(count = summary.invalid_dates, "rows with unparseable dates");
    }

    println!("Wrote {} transactions to {}", summary.data_rows, POST_OUTPUT);
    Ok(())
}

pub async fn wise(start: NaiveDate, end: NaiveDate) -> Result<()> {
    let range = DateRange::new(start, end)?;
    let dir = working_dir()?;
    let configs = load_configs(&dir).await?;
    info!(accounts = configs.len(), from = %start, to = %end, "fetching statements");

    let outcomes = sync_statements(configs, range, dir, connect(reqwest::Client::new())).await;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(path) => println!("{}: {}", outcome.account, path.display()),
            Err(e) => println!("{}: no data available ({e:#})", outcome.account),
        }
    }
    Ok(())
}

pub async fn wise_balance() -> Result<()> {
    let configs = load_configs(&working_dir()?).await?;
    let outcomes = balances_for_all(configs, connect(reqwest::Client::new())).await;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(balances) => {
                println!("{}", outcome.account);
                for b in balances {
                    println!("  {b}");
                }
            }
            Err(e) => println!("{}: no data available ({e:#})", outcome.account),
        }
    }
    Ok(())
}

fn working_dir() -> Result<PathBuf> {
    std::env::current_dir().context("resolve working directory")
}

fn connect(client: reqwest::Client) -> impl Fn(&RemoteConfig) -> Arc<dyn ApiTransport> {
    move |cfg: &RemoteConfig| -> Arc<dyn ApiTransport> {
        Arc::new(ReqwestTransport::new(client.clone(), &cfg.api_url))
    }
}
