//! ynab-wise: remittance API statements and balances, step-up signing, and ledger export

pub mod balance;
pub mod config;
pub mod error;
pub mod signing;
pub mod statement;
pub mod sync;
pub mod transport;

pub use balance::{fetch_balances, Balance};
pub use config::{load_configs, RemoteConfig};
pub use error::FetchError;
pub use signing::ChallengeSigner;
pub use statement::{fetch_statement, DateRange, Statement, TransactionEnvelope};
pub use sync::{balances_for_all, sync_statements, AccountOutcome};
pub use transport::{ApiRequest, ApiResponse, ApiTransport, ReqwestTransport};
