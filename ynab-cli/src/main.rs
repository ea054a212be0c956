use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "ynab-tools",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("YNAB_BUILD_SHA"), ")"),
    about = "YNAB tools to import bank statements"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a postal bank CSV statement into post-ynab.csv
    #[command(alias = "p")]
    Post {
        /// Path to the exported statement
        filename: PathBuf,
    },

    /// Fetch statements for every configured account (dates are YYYY-MM-DD, inclusive)
    Wise {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },

    /// Print current balances for every configured account
    WiseBalance,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Post { filename } => commands::post(&filename).await?,
        Command::Wise {
            start_date,
            end_date,
        } => commands::wise(start_date, end_date).await?,
        Command::WiseBalance => commands::wise_balance().await?,
    }

    Ok(())
}
